//! Array keywords. All of them ignore non-array instances.

use keel_value::Value;

use crate::failure::{FailureKind, ValidationFailure};
use crate::schema::{ObjectNode, SchemaId};
use crate::validate::Validator;

impl Validator<'_> {
    pub(crate) fn check_items(
        &self,
        object: &ObjectNode,
        schema: SchemaId,
        prefix_len: usize,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(items) = instance.as_array() else {
            return;
        };
        let mut failed_indexes = Vec::new();
        let mut causes = Vec::new();
        for (index, item) in items.iter().enumerate().skip(prefix_len) {
            if let Some(failure) = self.visit(schema, item, depth + 1) {
                failed_indexes.push(index);
                causes.push(failure);
            }
        }
        if !causes.is_empty() {
            out.push(
                self.keyword_failure(
                    FailureKind::Items { failed_indexes },
                    object,
                    "items",
                    instance,
                )
                .with_causes(causes),
            );
        }
    }

    pub(crate) fn check_prefix_items(
        &self,
        object: &ObjectNode,
        schemas: &[SchemaId],
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(items) = instance.as_array() else {
            return;
        };
        let mut failed_indexes = Vec::new();
        let mut causes = Vec::new();
        for (index, (schema, item)) in schemas.iter().zip(items).enumerate() {
            if let Some(failure) = self.visit(*schema, item, depth + 1) {
                failed_indexes.push(index);
                causes.push(failure);
            }
        }
        if !causes.is_empty() {
            out.push(
                self.keyword_failure(
                    FailureKind::PrefixItems { failed_indexes },
                    object,
                    "prefixItems",
                    instance,
                )
                .with_causes(causes),
            );
        }
    }

    pub(crate) fn check_min_items(
        &self,
        object: &ObjectNode,
        limit: u64,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(items) = instance.as_array()
            && (items.len() as u64) < limit
        {
            out.push(self.keyword_failure(
                FailureKind::MinItems {
                    limit,
                    actual: items.len(),
                },
                object,
                "minItems",
                instance,
            ));
        }
    }

    pub(crate) fn check_max_items(
        &self,
        object: &ObjectNode,
        limit: u64,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(items) = instance.as_array()
            && (items.len() as u64) > limit
        {
            out.push(self.keyword_failure(
                FailureKind::MaxItems {
                    limit,
                    actual: items.len(),
                },
                object,
                "maxItems",
                instance,
            ));
        }
    }

    /// Uniqueness is structural equality, so `1` and `1.0` collide while
    /// locations never matter. Reports the first colliding pair.
    pub(crate) fn check_unique_items(
        &self,
        object: &ObjectNode,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(items) = instance.as_array() else {
            return;
        };
        for second in 1..items.len() {
            for first in 0..second {
                if items[first] == items[second] {
                    out.push(self.keyword_failure(
                        FailureKind::UniqueItems {
                            first_index: first,
                            second_index: second,
                        },
                        object,
                        "uniqueItems",
                        instance,
                    ));
                    return;
                }
            }
        }
    }

    pub(crate) fn check_contains(
        &self,
        object: &ObjectNode,
        schema: SchemaId,
        min: u64,
        max: Option<u64>,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(items) = instance.as_array() else {
            return;
        };
        let matched = items
            .iter()
            .filter(|item| self.visit(schema, item, depth + 1).is_none())
            .count();
        let too_many = max.is_some_and(|max| (matched as u64) > max);
        if (matched as u64) < min || too_many {
            out.push(self.keyword_failure(
                FailureKind::Contains { matched, min, max },
                object,
                "contains",
                instance,
            ));
        }
    }
}
