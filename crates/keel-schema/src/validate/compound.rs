//! `$ref` delegation and the logical combinators.
//!
//! Combinators are defined over the pass/fail outcomes of their
//! branches: `allOf` collects every branch failure, `anyOf` fails only
//! when every branch fails, `oneOf` fails when the count of passing
//! branches is not exactly one, `not` inverts, and `if` selects `then`
//! or `else` without ever reporting its own condition's failure.

use keel_value::Value;

use crate::failure::{FailureKind, ValidationFailure};
use crate::schema::{ObjectNode, SchemaId};
use crate::validate::Validator;

impl Validator<'_> {
    /// Delegation: the referenced schema's failure surfaces unchanged,
    /// so the reported locations point at the real constraint.
    pub(crate) fn check_ref(
        &self,
        target: SchemaId,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(failure) = self.visit(target, instance, depth + 1) {
            out.push(failure);
        }
    }

    pub(crate) fn check_all_of(
        &self,
        object: &ObjectNode,
        branches: &[SchemaId],
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let causes: Vec<ValidationFailure> = branches
            .iter()
            .filter_map(|branch| self.visit(*branch, instance, depth + 1))
            .collect();
        if !causes.is_empty() {
            out.push(
                self.keyword_failure(
                    FailureKind::AllOf {
                        failed: causes.len(),
                        total: branches.len(),
                    },
                    object,
                    "allOf",
                    instance,
                )
                .with_causes(causes),
            );
        }
    }

    pub(crate) fn check_any_of(
        &self,
        object: &ObjectNode,
        branches: &[SchemaId],
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let causes: Vec<ValidationFailure> = branches
            .iter()
            .filter_map(|branch| self.visit(*branch, instance, depth + 1))
            .collect();
        // Branch failures are only reported when no branch passed.
        if causes.len() == branches.len() {
            out.push(
                self.keyword_failure(
                    FailureKind::AnyOf {
                        total: branches.len(),
                    },
                    object,
                    "anyOf",
                    instance,
                )
                .with_causes(causes),
            );
        }
    }

    pub(crate) fn check_one_of(
        &self,
        object: &ObjectNode,
        branches: &[SchemaId],
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let causes: Vec<ValidationFailure> = branches
            .iter()
            .filter_map(|branch| self.visit(*branch, instance, depth + 1))
            .collect();
        let matched = branches.len() - causes.len();
        if matched != 1 {
            out.push(
                self.keyword_failure(FailureKind::OneOf { matched }, object, "oneOf", instance)
                    .with_causes(causes),
            );
        }
    }

    pub(crate) fn check_not(
        &self,
        object: &ObjectNode,
        schema: SchemaId,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        if self.visit(schema, instance, depth + 1).is_none() {
            out.push(self.keyword_failure(FailureKind::Not, object, "not", instance));
        }
    }

    pub(crate) fn check_if_then_else(
        &self,
        condition: SchemaId,
        then: Option<SchemaId>,
        otherwise: Option<SchemaId>,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        // The condition's own failure is never reported; it only selects
        // the branch.
        let branch = if self.visit(condition, instance, depth + 1).is_none() {
            then
        } else {
            otherwise
        };
        if let Some(branch) = branch
            && let Some(failure) = self.visit(branch, instance, depth + 1)
        {
            out.push(failure);
        }
    }
}
