//! Recursive and cross-referencing schemas, and the recursion guard.

use keel_schema::{FailureKind, Validator, ValidatorConfig};
use serde_json::json;
use test_suite::{check, check_with_config, instance, leaf_pointers, schema};

/// A linked-list shape: every node may carry a `next` referencing the
/// root schema again.
fn linked_list_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["value"],
        "properties": {
            "value": {"type": "integer"},
            "next": {"$ref": "#"}
        }
    })
}

fn linked_list(depth: usize, poison_tail: bool) -> serde_json::Value {
    let tail_value = if poison_tail { json!("not an integer") } else { json!(0) };
    let mut node = json!({"value": tail_value});
    for level in 1..=depth {
        node = json!({"value": level, "next": node});
    }
    node
}

#[test]
fn self_referential_schema_loads_without_looping() {
    // Loading must terminate even though the graph is cyclic.
    let _ = schema(linked_list_schema());
}

#[test]
fn recursive_instances_validate_to_arbitrary_depth() {
    let compiled = schema(linked_list_schema());
    let validator = Validator::new(&compiled);
    assert!(validator.validate(&instance(linked_list(40, false))).is_none());
}

#[test]
fn deep_failures_carry_the_full_pointer() {
    let compiled = schema(linked_list_schema());
    let validator = Validator::new(&compiled);
    let failure = validator
        .validate(&instance(linked_list(3, true)))
        .unwrap();
    assert_eq!(
        leaf_pointers(&failure),
        vec!["#/next/next/next/value".to_string()]
    );
}

#[test]
fn mutually_recursive_definitions() {
    let document = json!({
        "$ref": "#/$defs/even",
        "$defs": {
            "even": {
                "properties": {"next": {"$ref": "#/$defs/odd"}},
                "required": ["even"]
            },
            "odd": {
                "properties": {"next": {"$ref": "#/$defs/even"}},
                "required": ["odd"]
            }
        }
    });
    assert!(check(
        document.clone(),
        json!({"even": 1, "next": {"odd": 1, "next": {"even": 1}}})
    )
    .is_none());
    assert!(check(document, json!({"even": 1, "next": {"even": 1}})).is_some());
}

#[test]
fn forward_references_resolve() {
    // The $ref appears before its target in document order.
    let document = json!({
        "properties": {"a": {"$ref": "#/$defs/later"}},
        "$defs": {"later": {"type": "boolean"}}
    });
    assert!(check(document.clone(), json!({"a": true})).is_none());
    assert!(check(document, json!({"a": 1})).is_some());
}

#[test]
fn unbounded_schema_recursion_fails_closed() {
    // A schema that refers to itself without consuming any instance
    // depth would recurse forever; the ceiling turns that into a
    // reported failure instead.
    let failure = check(json!({"$ref": "#"}), json!(1)).unwrap();
    assert!(matches!(
        failure.kind,
        FailureKind::RecursionLimitExceeded { .. }
    ));
}

#[test]
fn recursion_limit_is_configurable() {
    let config = ValidatorConfig {
        max_depth: 8,
        ..ValidatorConfig::default()
    };
    let failure = check_with_config(linked_list_schema(), linked_list(40, false), config).unwrap();
    assert!(failure
        .flatten()
        .iter()
        .any(|leaf| matches!(leaf.kind, FailureKind::RecursionLimitExceeded { limit: 8 })));
}

#[test]
fn compiled_schemas_are_shareable_across_threads() {
    let compiled = schema(linked_list_schema());
    let validator = Validator::new(&compiled);
    std::thread::scope(|scope| {
        for depth in [1usize, 5, 10, 20] {
            let validator = &validator;
            scope.spawn(move || {
                let ok = instance(linked_list(depth, false));
                let bad = instance(linked_list(depth, true));
                assert!(validator.validate(&ok).is_none());
                assert!(validator.validate(&bad).is_some());
            });
        }
    });
}
