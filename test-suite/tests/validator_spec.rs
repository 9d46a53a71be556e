//! End-to-end validation scenarios, including the boundary cases the
//! engine is contractually required to get right.

use keel_schema::{FailureKind, Validator};
use serde_json::json;
use test_suite::{check, instance, leaf_keywords, schema};

#[test]
fn true_schema_accepts_everything() {
    for value in [json!(null), json!(0), json!("x"), json!([1]), json!({"a": 1})] {
        assert!(check(json!(true), value).is_none());
    }
}

#[test]
fn false_schema_rejects_everything_with_one_failure() {
    for value in [json!(null), json!(0), json!("x"), json!([1]), json!({"a": 1})] {
        let failure = check(json!(false), value).unwrap();
        assert_eq!(failure.kind, FailureKind::FalseSchema);
        assert!(failure.causes.is_empty());
        assert_eq!(failure.flatten().len(), 1);
    }
}

#[test]
fn empty_schema_accepts_everything() {
    assert!(check(json!({}), json!({"anything": [1, 2, 3]})).is_none());
}

#[test]
fn minimum_boundary() {
    let document = json!({"minimum": 0});
    let failure = check(document.clone(), json!(-5)).unwrap();
    assert_eq!(failure.keyword(), Some("minimum"));
    assert!(check(document.clone(), json!(0)).is_none());
    // Numeric comparison is type-agnostic: 0.0 is the same value as 0.
    assert!(check(document, json!(0.0)).is_none());
}

#[test]
fn integer_type_accepts_whole_reals() {
    let document = json!({"type": "integer"});
    assert!(check(document.clone(), json!(10)).is_none());
    assert!(check(document.clone(), json!(10.0)).is_none());
    let failure = check(document, json!(10.5)).unwrap();
    assert_eq!(failure.keyword(), Some("type"));
}

#[test]
fn number_type_accepts_integers() {
    let document = json!({"type": "number"});
    assert!(check(document.clone(), json!(10)).is_none());
    assert!(check(document, json!(10.5)).is_none());
}

#[test]
fn multi_type_sets() {
    let document = json!({"type": ["string", "null"]});
    assert!(check(document.clone(), json!("x")).is_none());
    assert!(check(document.clone(), json!(null)).is_none());
    assert!(check(document, json!(1)).is_some());
}

#[test]
fn age_and_name_scenario_reports_two_siblings() {
    let document = json!({
        "type": "object",
        "properties": {
            "age": {"type": "number", "minimum": 0},
            "name": {"type": "string"}
        }
    });
    let failure = check(document, json!({"age": -5, "name": null})).unwrap();

    assert_eq!(failure.kind, FailureKind::Aggregate);
    assert_eq!(failure.causes.len(), 2);

    let minimum = &failure.causes[0];
    assert_eq!(minimum.keyword(), Some("minimum"));
    assert_eq!(minimum.instance_location.pointer.to_string(), "#/age");
    assert_eq!(
        minimum.schema_location.pointer.to_string(),
        "#/properties/age/minimum"
    );

    let type_failure = &failure.causes[1];
    assert_eq!(type_failure.keyword(), Some("type"));
    assert_eq!(type_failure.instance_location.pointer.to_string(), "#/name");
}

#[test]
fn missing_optional_properties_are_not_failures() {
    let document = json!({
        "type": "object",
        "properties": {
            "age": {"type": "number", "minimum": 0},
            "name": {"type": "string"}
        }
    });
    assert!(check(document, json!({})).is_none());
}

#[test]
fn all_of_with_min_length_scenario() {
    let failure = check(
        json!({"allOf": [{"type": "string"}, {"minLength": 3}]}),
        json!("hi"),
    )
    .unwrap();
    assert_eq!(failure.keyword(), Some("allOf"));
    assert_eq!(failure.causes.len(), 1);
    assert_eq!(failure.causes[0].keyword(), Some("minLength"));
    assert_eq!(leaf_keywords(&failure), ["minLength"]);
}

#[test]
fn validation_is_deterministic() {
    let document = json!({
        "type": "object",
        "required": ["id"],
        "properties": {
            "id": {"type": "string"},
            "tags": {"items": {"type": "string"}, "uniqueItems": true}
        }
    });
    let bad = json!({"tags": [1, 1]});
    let first = check(document.clone(), bad.clone()).unwrap();
    let second = check(document, bad).unwrap();
    assert_eq!(first, second);
}

#[test]
fn loading_twice_validates_identically() {
    let document = json!({
        "properties": {"n": {"$ref": "#/$defs/nat"}},
        "$defs": {"nat": {"type": "integer", "minimum": 0}}
    });
    let first = schema(document.clone());
    let second = schema(document);
    for value in [json!({"n": 3}), json!({"n": -3}), json!({"n": "x"}), json!({})] {
        let converted = instance(value);
        assert_eq!(
            Validator::new(&first).validate(&converted),
            Validator::new(&second).validate(&converted)
        );
    }
}

#[test]
fn no_short_circuit_every_violation_is_reported() {
    let document = json!({
        "type": "object",
        "required": ["missing"],
        "minProperties": 3,
        "properties": {"n": {"minimum": 10}}
    });
    let failure = check(document, json!({"n": 1})).unwrap();
    let keywords = leaf_keywords(&failure);
    assert!(keywords.contains(&"required"));
    assert!(keywords.contains(&"minProperties"));
    assert!(keywords.contains(&"minimum"));
}

#[test]
fn const_and_enum_use_structural_equality() {
    assert!(check(json!({"const": {"a": [1, 2]}}), json!({"a": [1, 2]})).is_none());
    assert!(check(json!({"const": {"a": [1, 2]}}), json!({"a": [1, 3]})).is_some());
    // 1 and 1.0 are the same value.
    assert!(check(json!({"const": 1}), json!(1.0)).is_none());

    let colors = json!({"enum": ["red", "green", 7]});
    assert!(check(colors.clone(), json!("green")).is_none());
    assert!(check(colors.clone(), json!(7.0)).is_none());
    let failure = check(colors, json!("blue")).unwrap();
    assert_eq!(failure.keyword(), Some("enum"));
}

#[test]
fn exclusive_bounds_and_multiples() {
    assert!(check(json!({"exclusiveMinimum": 0}), json!(0)).is_some());
    assert!(check(json!({"exclusiveMinimum": 0}), json!(0.001)).is_none());
    assert!(check(json!({"exclusiveMaximum": 10}), json!(10)).is_some());

    assert!(check(json!({"multipleOf": 0.1}), json!(10)).is_none());
    assert!(check(json!({"multipleOf": 0.1}), json!(10.05)).is_some());
    // Exact decimal arithmetic, no float artifacts.
    assert!(check(json!({"multipleOf": 0.01}), json!(0.07)).is_none());
}

#[test]
fn string_lengths_count_code_points() {
    assert!(check(json!({"minLength": 5}), json!("héllo")).is_none());
    assert!(check(json!({"maxLength": 2}), json!("🦀🦀")).is_none());
    assert!(check(json!({"maxLength": 2}), json!("abc")).is_some());
}

#[test]
fn pattern_is_a_search_not_a_full_match() {
    assert!(check(json!({"pattern": "ell"}), json!("hello")).is_none());
    assert!(check(json!({"pattern": "^h.*o$"}), json!("hello")).is_none());
    assert!(check(json!({"pattern": "^x"}), json!("hello")).is_some());
}

#[test]
fn non_matching_types_are_ignored_by_leaf_constraints() {
    // A string is not a number, so numeric bounds say nothing about it.
    assert!(check(json!({"minimum": 10}), json!("hello")).is_none());
    assert!(check(json!({"minLength": 10}), json!(3)).is_none());
    assert!(check(json!({"minItems": 10}), json!({"a": 1})).is_none());
}
