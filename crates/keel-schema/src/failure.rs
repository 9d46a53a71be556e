//! The validation failure tree.
//!
//! Validation never throws: every violated constraint becomes one
//! [`ValidationFailure`] node, combinator keywords nest the failures of
//! the branches they delegated to, and a fully valid instance is simply
//! the absence of a failure. This module only aggregates and renders;
//! the per-keyword logic lives in the validator.

use core::fmt;
use std::fmt::Write as _;

use keel_value::SourceLocation;
use serde_json::json;

use crate::schema::TypeSet;
use keel_value::Number;

/// What went wrong, with the substituted values the message needs.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// Several sibling keywords of one schema object failed; the actual
    /// failures are the causes.
    Aggregate,
    /// The `false` boolean schema.
    FalseSchema,
    Type { expected: TypeSet, actual: &'static str },
    Const,
    Enum { candidates: usize },
    Minimum { limit: Number, actual: Number },
    Maximum { limit: Number, actual: Number },
    ExclusiveMinimum { limit: Number, actual: Number },
    ExclusiveMaximum { limit: Number, actual: Number },
    MultipleOf { denominator: Number, actual: Number },
    MinLength { limit: u64, actual: usize },
    MaxLength { limit: u64, actual: usize },
    Pattern { pattern: String },
    Format { format: String },
    MinItems { limit: u64, actual: usize },
    MaxItems { limit: u64, actual: usize },
    UniqueItems { first_index: usize, second_index: usize },
    Contains { matched: usize, min: u64, max: Option<u64> },
    Items { failed_indexes: Vec<usize> },
    PrefixItems { failed_indexes: Vec<usize> },
    Required { missing: Vec<String> },
    PropertyNames { offenders: Vec<String> },
    MinProperties { limit: u64, actual: usize },
    MaxProperties { limit: u64, actual: usize },
    DependentRequired { trigger: String, missing: Vec<String> },
    DependentSchemas { failed: Vec<String> },
    AllOf { failed: usize, total: usize },
    AnyOf { total: usize },
    OneOf { matched: usize },
    Not,
    ReadOnly,
    WriteOnly,
    /// The configured recursion ceiling was reached; reported instead of
    /// overflowing the call stack.
    RecursionLimitExceeded { limit: usize },
}

impl FailureKind {
    /// The schema keyword this failure belongs to. `None` for outcomes
    /// that have no keyword of their own (aggregation, boolean schemas,
    /// the recursion guard).
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            FailureKind::Aggregate => None,
            FailureKind::FalseSchema => None,
            FailureKind::Type { .. } => Some("type"),
            FailureKind::Const => Some("const"),
            FailureKind::Enum { .. } => Some("enum"),
            FailureKind::Minimum { .. } => Some("minimum"),
            FailureKind::Maximum { .. } => Some("maximum"),
            FailureKind::ExclusiveMinimum { .. } => Some("exclusiveMinimum"),
            FailureKind::ExclusiveMaximum { .. } => Some("exclusiveMaximum"),
            FailureKind::MultipleOf { .. } => Some("multipleOf"),
            FailureKind::MinLength { .. } => Some("minLength"),
            FailureKind::MaxLength { .. } => Some("maxLength"),
            FailureKind::Pattern { .. } => Some("pattern"),
            FailureKind::Format { .. } => Some("format"),
            FailureKind::MinItems { .. } => Some("minItems"),
            FailureKind::MaxItems { .. } => Some("maxItems"),
            FailureKind::UniqueItems { .. } => Some("uniqueItems"),
            FailureKind::Contains { .. } => Some("contains"),
            FailureKind::Items { .. } => Some("items"),
            FailureKind::PrefixItems { .. } => Some("prefixItems"),
            FailureKind::Required { .. } => Some("required"),
            FailureKind::PropertyNames { .. } => Some("propertyNames"),
            FailureKind::MinProperties { .. } => Some("minProperties"),
            FailureKind::MaxProperties { .. } => Some("maxProperties"),
            FailureKind::DependentRequired { .. } => Some("dependentRequired"),
            FailureKind::DependentSchemas { .. } => Some("dependentSchemas"),
            FailureKind::AllOf { .. } => Some("allOf"),
            FailureKind::AnyOf { .. } => Some("anyOf"),
            FailureKind::OneOf { .. } => Some("oneOf"),
            FailureKind::Not => Some("not"),
            FailureKind::ReadOnly => Some("readOnly"),
            FailureKind::WriteOnly => Some("writeOnly"),
            FailureKind::RecursionLimitExceeded { .. } => None,
        }
    }
}

fn join_list(items: &[impl fmt::Display]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{item}");
    }
    out
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Aggregate => write!(f, "multiple validation failures"),
            FailureKind::FalseSchema => write!(f, "false schema always fails"),
            FailureKind::Type { expected, actual } => {
                write!(f, "expected type: {expected}, actual: {actual}")
            }
            FailureKind::Const => {
                write!(f, "actual instance is not the same as the constant in the schema")
            }
            FailureKind::Enum { candidates } => {
                write!(f, "the instance is not equal to any of the {candidates} enum values")
            }
            FailureKind::Minimum { limit, actual } => {
                write!(f, "{actual} is lower than minimum {limit}")
            }
            FailureKind::Maximum { limit, actual } => {
                write!(f, "{actual} is greater than maximum {limit}")
            }
            FailureKind::ExclusiveMinimum { limit, actual } => {
                write!(f, "{actual} is lower than or equal to exclusive minimum {limit}")
            }
            FailureKind::ExclusiveMaximum { limit, actual } => {
                write!(f, "{actual} is greater than or equal to exclusive maximum {limit}")
            }
            FailureKind::MultipleOf { denominator, actual } => {
                write!(f, "{actual} is not a multiple of {denominator}")
            }
            FailureKind::MinLength { limit, actual } => {
                write!(f, "expected minimum length: {limit}, actual: {actual}")
            }
            FailureKind::MaxLength { limit, actual } => {
                write!(f, "expected maximum length: {limit}, actual: {actual}")
            }
            FailureKind::Pattern { pattern } => {
                write!(f, "instance value did not match pattern {pattern:?}")
            }
            FailureKind::Format { format } => {
                write!(f, "instance does not match format '{format}'")
            }
            FailureKind::MinItems { limit, actual } => {
                write!(f, "expected minimum items: {limit}, found only {actual}")
            }
            FailureKind::MaxItems { limit, actual } => {
                write!(f, "expected maximum items: {limit}, found {actual}")
            }
            FailureKind::UniqueItems { first_index, second_index } => {
                write!(
                    f,
                    "items at positions {first_index} and {second_index} are equal, but array items must be unique"
                )
            }
            FailureKind::Contains { matched, min, max } => {
                if let Some(max) = max
                    && (*matched as u64) > *max
                {
                    write!(
                        f,
                        "{matched} array items are valid against \"contains\" subschema, expected maximum is {max}"
                    )
                } else {
                    let prefix = match matched {
                        0 => "no array items are".to_string(),
                        1 => "only 1 array item is".to_string(),
                        n => format!("only {n} array items are"),
                    };
                    write!(
                        f,
                        "{prefix} valid against \"contains\" subschema, expected minimum is {min}"
                    )
                }
            }
            FailureKind::Items { failed_indexes } => {
                write!(
                    f,
                    "array items {} failed to validate against \"items\" subschema",
                    join_list(failed_indexes)
                )
            }
            FailureKind::PrefixItems { failed_indexes } => {
                write!(
                    f,
                    "array items {} failed to validate against \"prefixItems\" subschema",
                    join_list(failed_indexes)
                )
            }
            FailureKind::Required { missing } => {
                write!(f, "required properties are missing: {}", join_list(missing))
            }
            FailureKind::PropertyNames { offenders } => {
                write!(
                    f,
                    "property names {} failed to validate against \"propertyNames\" subschema",
                    join_list(offenders)
                )
            }
            FailureKind::MinProperties { limit, actual } => {
                write!(f, "expected minimum number of properties: {limit}, found {actual}")
            }
            FailureKind::MaxProperties { limit, actual } => {
                write!(f, "expected maximum number of properties: {limit}, found {actual}")
            }
            FailureKind::DependentRequired { trigger, missing } => {
                write!(
                    f,
                    "property {trigger:?} requires properties {}, but they are missing",
                    join_list(missing)
                )
            }
            FailureKind::DependentSchemas { failed } => {
                write!(
                    f,
                    "properties {} failed to validate against their dependent schemas",
                    join_list(failed)
                )
            }
            FailureKind::AllOf { failed, total } => {
                write!(f, "{failed} subschemas out of {total} failed to validate")
            }
            FailureKind::AnyOf { total } => {
                write!(f, "no subschema out of {total} validated successfully")
            }
            FailureKind::OneOf { matched } => {
                write!(f, "expected exactly 1 subschema to validate, but {matched} did")
            }
            FailureKind::Not => write!(f, "negated subschema did not fail"),
            FailureKind::ReadOnly => {
                write!(f, "value is readOnly, but the validation context is write")
            }
            FailureKind::WriteOnly => {
                write!(f, "value is writeOnly, but the validation context is read")
            }
            FailureKind::RecursionLimitExceeded { limit } => {
                write!(f, "validation recursion limit of {limit} exceeded")
            }
        }
    }
}

/// One node of the failure tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub kind: FailureKind,
    /// Pointer to the violated keyword inside the schema document.
    pub schema_location: SourceLocation,
    /// Pointer to the offending value inside the validated document.
    pub instance_location: SourceLocation,
    /// Failures of delegated subschemas, for combinator and applicator
    /// keywords; empty for leaf constraints.
    pub causes: Vec<ValidationFailure>,
}

impl ValidationFailure {
    pub fn new(
        kind: FailureKind,
        schema_location: SourceLocation,
        instance_location: SourceLocation,
    ) -> ValidationFailure {
        ValidationFailure {
            kind,
            schema_location,
            instance_location,
            causes: Vec::new(),
        }
    }

    pub fn with_causes(mut self, causes: Vec<ValidationFailure>) -> ValidationFailure {
        self.causes = causes;
        self
    }

    /// The keyword identity of this failure, when it has one.
    pub fn keyword(&self) -> Option<&'static str> {
        self.kind.keyword()
    }

    /// The human-readable message with values substituted in.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// All leaf failures of the tree, in reporting order.
    pub fn flatten(&self) -> Vec<&ValidationFailure> {
        if self.causes.is_empty() {
            return vec![self];
        }
        self.causes.iter().flat_map(|cause| cause.flatten()).collect()
    }

    /// A multi-line human-readable report: one line per failure node
    /// (instance location, message, keyword and schema pointer), nested
    /// failures indented under their parent.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = write!(out, "{}: {}", self.instance_location, self.kind);
        match self.keyword() {
            Some(keyword) => {
                let _ = writeln!(out, " (keyword \"{keyword}\", schema {})", self.schema_location);
            }
            None => {
                let _ = writeln!(out, " (schema {})", self.schema_location);
            }
        }
        for cause in &self.causes {
            cause.render_into(out, depth + 1);
        }
    }

    /// The failure tree as JSON, for machine consumers.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(
            "instanceRef".to_string(),
            json!(self.instance_location.pointer.to_string()),
        );
        object.insert(
            "schemaRef".to_string(),
            json!(self.schema_location.pointer.to_string()),
        );
        object.insert("message".to_string(), json!(self.message()));
        if let Some(keyword) = self.keyword() {
            object.insert("keyword".to_string(), json!(keyword));
        }
        if !self.causes.is_empty() {
            object.insert(
                "causes".to_string(),
                serde_json::Value::Array(self.causes.iter().map(|cause| cause.to_json()).collect()),
            );
        }
        serde_json::Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_value::Pointer;

    fn location(segments: &[&str]) -> SourceLocation {
        SourceLocation::new(None, segments.iter().copied().collect::<Pointer>())
    }

    fn minimum_failure() -> ValidationFailure {
        ValidationFailure::new(
            FailureKind::Minimum {
                limit: Number::from(0i64),
                actual: Number::parse("-5").unwrap(),
            },
            location(&["properties", "age", "minimum"]),
            location(&["age"]),
        )
    }

    #[test]
    fn message_substitutes_values() {
        assert_eq!(minimum_failure().message(), "-5 is lower than minimum 0");
    }

    #[test]
    fn render_contains_keyword_and_both_locations() {
        let rendered = minimum_failure().render();
        assert!(rendered.contains("#/age"));
        assert!(rendered.contains("keyword \"minimum\""));
        assert!(rendered.contains("#/properties/age/minimum"));
    }

    #[test]
    fn render_indents_causes() {
        let parent = ValidationFailure::new(
            FailureKind::AllOf { failed: 1, total: 2 },
            location(&["allOf"]),
            location(&[]),
        )
        .with_causes(vec![minimum_failure()]);
        let rendered = parent.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('#'));
        assert!(lines[1].starts_with("  "));
    }

    #[test]
    fn flatten_returns_leaves() {
        let parent = ValidationFailure::new(
            FailureKind::Aggregate,
            location(&[]),
            location(&[]),
        )
        .with_causes(vec![minimum_failure(), minimum_failure()]);
        assert_eq!(parent.flatten().len(), 2);
    }

    #[test]
    fn json_export_shape() {
        let parent = ValidationFailure::new(
            FailureKind::AllOf { failed: 1, total: 2 },
            location(&["allOf"]),
            location(&[]),
        )
        .with_causes(vec![minimum_failure()]);
        let exported = parent.to_json();
        assert_eq!(exported["keyword"], "allOf");
        assert_eq!(exported["schemaRef"], "#/allOf");
        assert_eq!(exported["causes"][0]["instanceRef"], "#/age");
        assert_eq!(exported["causes"][0]["keyword"], "minimum");
    }

    #[test]
    fn aggregate_has_no_keyword() {
        let aggregate =
            ValidationFailure::new(FailureKind::Aggregate, location(&[]), location(&[]));
        assert_eq!(aggregate.keyword(), None);
        assert!(!aggregate.to_json().as_object().unwrap().contains_key("keyword"));
    }
}
