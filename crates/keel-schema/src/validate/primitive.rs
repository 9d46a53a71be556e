//! Type, literal, numeric, string and context keywords.
//!
//! Constraints in this family ignore instances of a foreign type:
//! `minimum` says nothing about strings, `minLength` nothing about
//! numbers. Type enforcement is the `type` keyword's job alone.

use keel_value::{Number, Value};

use crate::failure::{FailureKind, ValidationFailure};
use crate::format;
use crate::schema::{ObjectNode, Pattern, TypeSet};
use crate::validate::{ReadWriteContext, Validator};

impl Validator<'_> {
    pub(crate) fn check_type(
        &self,
        object: &ObjectNode,
        types: &TypeSet,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        let actual = instance.type_name();
        if !types.permits(actual) {
            out.push(self.keyword_failure(
                FailureKind::Type {
                    expected: types.clone(),
                    actual,
                },
                object,
                "type",
                instance,
            ));
        }
    }

    pub(crate) fn check_const(
        &self,
        object: &ObjectNode,
        expected: &Value,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if instance != expected {
            out.push(self.keyword_failure(FailureKind::Const, object, "const", instance));
        }
    }

    pub(crate) fn check_enum(
        &self,
        object: &ObjectNode,
        candidates: &[Value],
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if !candidates.iter().any(|candidate| candidate == instance) {
            out.push(self.keyword_failure(
                FailureKind::Enum {
                    candidates: candidates.len(),
                },
                object,
                "enum",
                instance,
            ));
        }
    }

    pub(crate) fn check_minimum(
        &self,
        object: &ObjectNode,
        limit: &Number,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(actual) = instance.as_number()
            && actual < limit
        {
            out.push(self.keyword_failure(
                FailureKind::Minimum {
                    limit: limit.clone(),
                    actual: actual.clone(),
                },
                object,
                "minimum",
                instance,
            ));
        }
    }

    pub(crate) fn check_maximum(
        &self,
        object: &ObjectNode,
        limit: &Number,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(actual) = instance.as_number()
            && actual > limit
        {
            out.push(self.keyword_failure(
                FailureKind::Maximum {
                    limit: limit.clone(),
                    actual: actual.clone(),
                },
                object,
                "maximum",
                instance,
            ));
        }
    }

    pub(crate) fn check_exclusive_minimum(
        &self,
        object: &ObjectNode,
        limit: &Number,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(actual) = instance.as_number()
            && actual <= limit
        {
            out.push(self.keyword_failure(
                FailureKind::ExclusiveMinimum {
                    limit: limit.clone(),
                    actual: actual.clone(),
                },
                object,
                "exclusiveMinimum",
                instance,
            ));
        }
    }

    pub(crate) fn check_exclusive_maximum(
        &self,
        object: &ObjectNode,
        limit: &Number,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(actual) = instance.as_number()
            && actual >= limit
        {
            out.push(self.keyword_failure(
                FailureKind::ExclusiveMaximum {
                    limit: limit.clone(),
                    actual: actual.clone(),
                },
                object,
                "exclusiveMaximum",
                instance,
            ));
        }
    }

    pub(crate) fn check_multiple_of(
        &self,
        object: &ObjectNode,
        denominator: &Number,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(actual) = instance.as_number()
            && !actual.is_multiple_of(denominator)
        {
            out.push(self.keyword_failure(
                FailureKind::MultipleOf {
                    denominator: denominator.clone(),
                    actual: actual.clone(),
                },
                object,
                "multipleOf",
                instance,
            ));
        }
    }

    pub(crate) fn check_min_length(
        &self,
        object: &ObjectNode,
        limit: u64,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(text) = instance.as_str() {
            // Lengths count Unicode scalar values, not encoded bytes.
            let actual = text.chars().count();
            if (actual as u64) < limit {
                out.push(self.keyword_failure(
                    FailureKind::MinLength { limit, actual },
                    object,
                    "minLength",
                    instance,
                ));
            }
        }
    }

    pub(crate) fn check_max_length(
        &self,
        object: &ObjectNode,
        limit: u64,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(text) = instance.as_str() {
            let actual = text.chars().count();
            if (actual as u64) > limit {
                out.push(self.keyword_failure(
                    FailureKind::MaxLength { limit, actual },
                    object,
                    "maxLength",
                    instance,
                ));
            }
        }
    }

    pub(crate) fn check_pattern(
        &self,
        object: &ObjectNode,
        pattern: &Pattern,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(text) = instance.as_str()
            && !pattern.is_match(text)
        {
            out.push(self.keyword_failure(
                FailureKind::Pattern {
                    pattern: pattern.source().to_string(),
                },
                object,
                "pattern",
                instance,
            ));
        }
    }

    pub(crate) fn check_format(
        &self,
        object: &ObjectNode,
        format: &str,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if !self.config().format_assertion {
            return;
        }
        if let Some(text) = instance.as_str()
            && !format::matches_format(format, text)
        {
            out.push(self.keyword_failure(
                FailureKind::Format {
                    format: format.to_string(),
                },
                object,
                "format",
                instance,
            ));
        }
    }

    pub(crate) fn check_read_only(
        &self,
        object: &ObjectNode,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if self.config().read_write_context == ReadWriteContext::Write {
            out.push(self.keyword_failure(FailureKind::ReadOnly, object, "readOnly", instance));
        }
    }

    pub(crate) fn check_write_only(
        &self,
        object: &ObjectNode,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if self.config().read_write_context == ReadWriteContext::Read {
            out.push(self.keyword_failure(FailureKind::WriteOnly, object, "writeOnly", instance));
        }
    }
}
