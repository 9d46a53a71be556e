//! Instance validation against a compiled [`Schema`].
//!
//! The validator is a pure tree walk: every keyword of the current
//! schema object is evaluated independently against the instance, all
//! resulting failures are aggregated as siblings, and applicator
//! keywords recurse into their subschemas with the relevant piece of the
//! instance. Nothing short-circuits, so one call surfaces every
//! violation at once.
//!
//! Per-keyword handlers live in the submodules, grouped by keyword
//! family.

mod array;
mod compound;
mod object;
mod primitive;

use keel_value::Value;

use crate::failure::{FailureKind, ValidationFailure};
use crate::schema::{Keyword, ObjectNode, Schema, SchemaId, SchemaNode};

/// Whether the instance is being validated as data that was just read
/// or data about to be written, for `readOnly`/`writeOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadWriteContext {
    Read,
    Write,
    #[default]
    None,
}

/// Validation configuration.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// When `false` (the default), `format` is advisory and never fails.
    pub format_assertion: bool,
    pub read_write_context: ReadWriteContext,
    /// Ceiling on nested subschema applications. Exceeding it yields a
    /// `RecursionLimitExceeded` failure instead of a stack overflow.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            format_assertion: false,
            read_write_context: ReadWriteContext::None,
            max_depth: 128,
        }
    }
}

/// Validates instances against one compiled schema.
///
/// Holds no per-call state, so one validator can be reused, including
/// concurrently from several threads.
pub struct Validator<'s> {
    schema: &'s Schema,
    config: ValidatorConfig,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema) -> Validator<'s> {
        Validator::with_config(schema, ValidatorConfig::default())
    }

    pub fn with_config(schema: &'s Schema, config: ValidatorConfig) -> Validator<'s> {
        Validator { schema, config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate an instance. `None` means the instance is valid;
    /// otherwise the returned tree describes every violation.
    pub fn validate(&self, instance: &Value) -> Option<ValidationFailure> {
        self.visit(self.schema.root(), instance, 0)
    }

    pub(crate) fn visit(
        &self,
        id: SchemaId,
        instance: &Value,
        depth: usize,
    ) -> Option<ValidationFailure> {
        let node = self.schema.node(id);
        if depth >= self.config.max_depth {
            return Some(ValidationFailure::new(
                FailureKind::RecursionLimitExceeded {
                    limit: self.config.max_depth,
                },
                node.location().clone(),
                instance.location().clone(),
            ));
        }
        match node {
            SchemaNode::Boolean { allow: true, .. } => None,
            SchemaNode::Boolean {
                allow: false,
                location,
            } => Some(ValidationFailure::new(
                FailureKind::FalseSchema,
                location.clone(),
                instance.location().clone(),
            )),
            SchemaNode::Object(object) => {
                let mut failures = Vec::new();
                for keyword in &object.keywords {
                    self.check_keyword(object, keyword, instance, depth, &mut failures);
                }
                match failures.len() {
                    0 => None,
                    1 => failures.pop(),
                    _ => Some(
                        ValidationFailure::new(
                            FailureKind::Aggregate,
                            object.location.clone(),
                            instance.location().clone(),
                        )
                        .with_causes(failures),
                    ),
                }
            }
        }
    }

    fn check_keyword(
        &self,
        object: &ObjectNode,
        keyword: &Keyword,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        match keyword {
            Keyword::Ref { target, .. } => self.check_ref(*target, instance, depth, out),
            Keyword::Type(types) => self.check_type(object, types, instance, out),
            Keyword::Const(expected) => self.check_const(object, expected, instance, out),
            Keyword::Enum(candidates) => self.check_enum(object, candidates, instance, out),
            Keyword::Minimum(limit) => self.check_minimum(object, limit, instance, out),
            Keyword::Maximum(limit) => self.check_maximum(object, limit, instance, out),
            Keyword::ExclusiveMinimum(limit) => {
                self.check_exclusive_minimum(object, limit, instance, out)
            }
            Keyword::ExclusiveMaximum(limit) => {
                self.check_exclusive_maximum(object, limit, instance, out)
            }
            Keyword::MultipleOf(denominator) => {
                self.check_multiple_of(object, denominator, instance, out)
            }
            Keyword::MinLength(limit) => self.check_min_length(object, *limit, instance, out),
            Keyword::MaxLength(limit) => self.check_max_length(object, *limit, instance, out),
            Keyword::Pattern(pattern) => self.check_pattern(object, pattern, instance, out),
            Keyword::Format(format) => self.check_format(object, format, instance, out),
            Keyword::Items { schema, prefix_len } => {
                self.check_items(object, *schema, *prefix_len, instance, depth, out)
            }
            Keyword::PrefixItems(schemas) => {
                self.check_prefix_items(object, schemas, instance, depth, out)
            }
            Keyword::MinItems(limit) => self.check_min_items(object, *limit, instance, out),
            Keyword::MaxItems(limit) => self.check_max_items(object, *limit, instance, out),
            Keyword::UniqueItems => self.check_unique_items(object, instance, out),
            Keyword::Contains { schema, min, max } => {
                self.check_contains(object, *schema, *min, *max, instance, depth, out)
            }
            Keyword::Properties(properties) => {
                self.check_properties(properties, instance, depth, out)
            }
            Keyword::PatternProperties(entries) => {
                self.check_pattern_properties(entries, instance, depth, out)
            }
            Keyword::AdditionalProperties(schema) => {
                self.check_additional_properties(object, *schema, instance, depth, out)
            }
            Keyword::Required(required) => self.check_required(object, required, instance, out),
            Keyword::PropertyNames(schema) => {
                self.check_property_names(object, *schema, instance, depth, out)
            }
            Keyword::MinProperties(limit) => {
                self.check_min_properties(object, *limit, instance, out)
            }
            Keyword::MaxProperties(limit) => {
                self.check_max_properties(object, *limit, instance, out)
            }
            Keyword::DependentRequired(dependencies) => {
                self.check_dependent_required(object, dependencies, instance, out)
            }
            Keyword::DependentSchemas(dependencies) => {
                self.check_dependent_schemas(object, dependencies, instance, depth, out)
            }
            Keyword::AllOf(branches) => self.check_all_of(object, branches, instance, depth, out),
            Keyword::AnyOf(branches) => self.check_any_of(object, branches, instance, depth, out),
            Keyword::OneOf(branches) => self.check_one_of(object, branches, instance, depth, out),
            Keyword::Not(schema) => self.check_not(object, *schema, instance, depth, out),
            Keyword::IfThenElse {
                condition,
                then,
                otherwise,
            } => self.check_if_then_else(*condition, *then, *otherwise, instance, depth, out),
            Keyword::ReadOnly => self.check_read_only(object, instance, out),
            Keyword::WriteOnly => self.check_write_only(object, instance, out),
        }
    }

    /// A failure for `keyword` of this schema object, located at the
    /// keyword inside the schema document and at the offending instance
    /// value.
    pub(crate) fn keyword_failure(
        &self,
        kind: FailureKind,
        object: &ObjectNode,
        keyword: &'static str,
        instance: &Value,
    ) -> ValidationFailure {
        ValidationFailure::new(
            kind,
            object.location.child(keyword),
            instance.location().clone(),
        )
    }
}
