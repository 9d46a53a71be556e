//! Shared helpers for the workspace-level integration tests.

use keel_json::json_to_value;
use keel_schema::{Schema, ValidationFailure, Validator, ValidatorConfig, compile};
use keel_value::Value;

/// Compile a schema document given as a `serde_json` literal.
pub fn schema(document: serde_json::Value) -> Schema {
    let document = json_to_value(&document, None).expect("schema document conversion");
    compile(&document).expect("schema compilation")
}

/// Convert an instance document given as a `serde_json` literal.
pub fn instance(document: serde_json::Value) -> Value {
    json_to_value(&document, None).expect("instance conversion")
}

/// Compile, validate, and return the outcome in one step.
pub fn check(
    schema_document: serde_json::Value,
    instance_document: serde_json::Value,
) -> Option<ValidationFailure> {
    let schema = schema(schema_document);
    Validator::new(&schema).validate(&instance(instance_document))
}

/// Like [`check`], with a non-default validator configuration.
pub fn check_with_config(
    schema_document: serde_json::Value,
    instance_document: serde_json::Value,
    config: ValidatorConfig,
) -> Option<ValidationFailure> {
    let schema = schema(schema_document);
    Validator::with_config(&schema, config).validate(&instance(instance_document))
}

/// The instance pointers of all leaf failures, in reporting order.
pub fn leaf_pointers(failure: &ValidationFailure) -> Vec<String> {
    failure
        .flatten()
        .into_iter()
        .map(|leaf| leaf.instance_location.pointer.to_string())
        .collect()
}

/// The keywords of all leaf failures, in reporting order.
pub fn leaf_keywords(failure: &ValidationFailure) -> Vec<&'static str> {
    failure
        .flatten()
        .into_iter()
        .filter_map(|leaf| leaf.keyword())
        .collect()
}
