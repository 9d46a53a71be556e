//! Truth tables for the logical combinators and `if`/`then`/`else`.

use keel_schema::FailureKind;
use serde_json::json;
use test_suite::check;

#[test]
fn all_of_passes_only_when_every_branch_passes() {
    let document = json!({"allOf": [{"minimum": 0}, {"maximum": 10}]});
    assert!(check(document.clone(), json!(5)).is_none());

    let failure = check(document.clone(), json!(-1)).unwrap();
    assert_eq!(failure.keyword(), Some("allOf"));
    assert_eq!(failure.causes.len(), 1);

    // Only the failing branch is counted and reported.
    let mixed = json!({"allOf": [{"type": "number"}, {"minimum": 0}]});
    let failure = check(mixed, json!(-1)).unwrap();
    assert_eq!(failure.kind, FailureKind::AllOf { failed: 1, total: 2 });
    assert_eq!(failure.causes[0].keyword(), Some("minimum"));
}

#[test]
fn all_of_collects_every_failing_branch() {
    let document = json!({"allOf": [{"minimum": 0}, {"multipleOf": 2}]});
    let failure = check(document, json!(-3)).unwrap();
    assert_eq!(failure.kind, FailureKind::AllOf { failed: 2, total: 2 });
    assert_eq!(failure.causes.len(), 2);
}

#[test]
fn any_of_passes_when_at_least_one_branch_passes() {
    let document = json!({"anyOf": [{"type": "string"}, {"minimum": 0}]});
    assert!(check(document.clone(), json!("x")).is_none());
    assert!(check(document.clone(), json!(5)).is_none());

    // Branch failures surface only when every branch failed.
    let failure = check(document, json!(-1)).unwrap();
    assert_eq!(failure.kind, FailureKind::AnyOf { total: 2 });
    assert_eq!(failure.causes.len(), 2);
}

#[test]
fn one_of_requires_exactly_one_passing_branch() {
    let document = json!({"oneOf": [{"minimum": 0}, {"maximum": 10}]});

    // 20 passes only the first branch, -5 only the second.
    assert!(check(document.clone(), json!(20)).is_none());
    assert!(check(document.clone(), json!(-5)).is_none());

    // 5 passes both: failure with zero causes, since no branch failed.
    let failure = check(document.clone(), json!(5)).unwrap();
    assert_eq!(failure.kind, FailureKind::OneOf { matched: 2 });
    assert!(failure.causes.is_empty());

    // A string passes neither numeric-typed branch? Both numeric branches
    // ignore strings, so both pass; still not exactly one.
    let failure = check(document, json!("x")).unwrap();
    assert_eq!(failure.kind, FailureKind::OneOf { matched: 2 });
}

#[test]
fn one_of_with_zero_matches_reports_all_branch_failures() {
    let document = json!({"oneOf": [{"type": "string"}, {"type": "boolean"}]});
    let failure = check(document, json!(3)).unwrap();
    assert_eq!(failure.kind, FailureKind::OneOf { matched: 0 });
    assert_eq!(failure.causes.len(), 2);
}

#[test]
fn not_inverts_its_subschema() {
    let document = json!({"not": {"type": "string"}});
    assert!(check(document.clone(), json!(5)).is_none());
    let failure = check(document, json!("x")).unwrap();
    assert_eq!(failure.kind, FailureKind::Not);

    // Double negation.
    let document = json!({"not": {"not": {"type": "string"}}});
    assert!(check(document.clone(), json!("x")).is_none());
    assert!(check(document, json!(5)).is_some());
}

#[test]
fn if_then_else_selects_a_branch_silently() {
    let document = json!({
        "if": {"type": "number"},
        "then": {"minimum": 0},
        "else": {"minLength": 3}
    });
    // Condition holds: `then` applies.
    assert!(check(document.clone(), json!(5)).is_none());
    let failure = check(document.clone(), json!(-5)).unwrap();
    assert_eq!(failure.keyword(), Some("minimum"));

    // Condition fails silently: `else` applies, and the condition's own
    // failure never shows up.
    assert!(check(document.clone(), json!("long enough")).is_none());
    let failure = check(document, json!("ab")).unwrap();
    assert_eq!(failure.keyword(), Some("minLength"));
    assert!(failure.flatten().iter().all(|leaf| leaf.keyword() != Some("type")));
}

#[test]
fn if_without_branches_never_fails() {
    assert!(check(json!({"if": {"type": "number"}}), json!(5)).is_none());
    assert!(check(json!({"if": {"type": "number"}}), json!("x")).is_none());

    // `then` alone is inert when the condition fails.
    let document = json!({"if": {"type": "number"}, "then": {"minimum": 0}});
    assert!(check(document, json!("x")).is_none());

    // `then`/`else` without `if` are inert entirely.
    assert!(check(json!({"then": {"minimum": 0}}), json!(-5)).is_none());
    assert!(check(json!({"else": {"minimum": 0}}), json!(-5)).is_none());
}

#[test]
fn combinators_nest() {
    let document = json!({
        "anyOf": [
            {"allOf": [{"type": "number"}, {"minimum": 0}]},
            {"not": {"type": "number"}}
        ]
    });
    assert!(check(document.clone(), json!(3)).is_none());
    assert!(check(document.clone(), json!("x")).is_none());
    let failure = check(document, json!(-3)).unwrap();
    assert_eq!(failure.keyword(), Some("anyOf"));
    assert_eq!(failure.causes.len(), 2);
}
