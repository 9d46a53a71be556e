//! Object keywords. All of them ignore non-object instances, and a
//! missing optional member is never a failure: its subschema is simply
//! not evaluated.

use indexmap::IndexMap;
use keel_value::{SourceLocation, Value, ValueContent};

use crate::failure::{FailureKind, ValidationFailure};
use crate::schema::{ObjectNode, Pattern, SchemaId};
use crate::validate::Validator;

impl Validator<'_> {
    /// Member failures surface as siblings of the other keyword
    /// failures, not wrapped in a `properties` node: the member's own
    /// failure already carries its instance pointer.
    pub(crate) fn check_properties(
        &self,
        properties: &IndexMap<String, SchemaId>,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(members) = instance.as_object() else {
            return;
        };
        for (property, schema) in properties {
            if let Some(member) = members.get(property)
                && let Some(failure) = self.visit(*schema, member, depth + 1)
            {
                out.push(failure);
            }
        }
    }

    pub(crate) fn check_pattern_properties(
        &self,
        entries: &[(Pattern, SchemaId)],
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(members) = instance.as_object() else {
            return;
        };
        for (pattern, schema) in entries {
            for (property, member) in members {
                if pattern.is_match(property)
                    && let Some(failure) = self.visit(*schema, member, depth + 1)
                {
                    out.push(failure);
                }
            }
        }
    }

    /// Applies only to members matched by neither `properties` nor any
    /// `patternProperties` pattern of the same schema object.
    pub(crate) fn check_additional_properties(
        &self,
        object: &ObjectNode,
        schema: SchemaId,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(members) = instance.as_object() else {
            return;
        };
        let named = object.property_names();
        for (property, member) in members {
            if named.is_some_and(|named| named.contains_key(property)) {
                continue;
            }
            if object.property_patterns().any(|pattern| pattern.is_match(property)) {
                continue;
            }
            if let Some(failure) = self.visit(schema, member, depth + 1) {
                out.push(failure);
            }
        }
    }

    pub(crate) fn check_required(
        &self,
        object: &ObjectNode,
        required: &[String],
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(members) = instance.as_object() else {
            return;
        };
        let missing: Vec<String> = required
            .iter()
            .filter(|property| !members.contains_key(property.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            out.push(self.keyword_failure(
                FailureKind::Required { missing },
                object,
                "required",
                instance,
            ));
        }
    }

    pub(crate) fn check_property_names(
        &self,
        object: &ObjectNode,
        schema: SchemaId,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(members) = instance.as_object() else {
            return;
        };
        let mut offenders = Vec::new();
        let mut causes = Vec::new();
        for property in members.keys() {
            // The key itself is the instance here; it has no location of
            // its own, so it borrows the member's pointer.
            let key_location = SourceLocation::new(
                instance.location().document.clone(),
                instance.location().pointer.child(property.as_str()),
            );
            let key_value = Value::new(ValueContent::String(property.clone()), key_location);
            if let Some(failure) = self.visit(schema, &key_value, depth + 1) {
                offenders.push(property.clone());
                causes.push(failure);
            }
        }
        if !causes.is_empty() {
            out.push(
                self.keyword_failure(
                    FailureKind::PropertyNames { offenders },
                    object,
                    "propertyNames",
                    instance,
                )
                .with_causes(causes),
            );
        }
    }

    pub(crate) fn check_min_properties(
        &self,
        object: &ObjectNode,
        limit: u64,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(members) = instance.as_object()
            && (members.len() as u64) < limit
        {
            out.push(self.keyword_failure(
                FailureKind::MinProperties {
                    limit,
                    actual: members.len(),
                },
                object,
                "minProperties",
                instance,
            ));
        }
    }

    pub(crate) fn check_max_properties(
        &self,
        object: &ObjectNode,
        limit: u64,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        if let Some(members) = instance.as_object()
            && (members.len() as u64) > limit
        {
            out.push(self.keyword_failure(
                FailureKind::MaxProperties {
                    limit,
                    actual: members.len(),
                },
                object,
                "maxProperties",
                instance,
            ));
        }
    }

    pub(crate) fn check_dependent_required(
        &self,
        object: &ObjectNode,
        dependencies: &IndexMap<String, Vec<String>>,
        instance: &Value,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(members) = instance.as_object() else {
            return;
        };
        for (trigger, required) in dependencies {
            if !members.contains_key(trigger.as_str()) {
                continue;
            }
            let missing: Vec<String> = required
                .iter()
                .filter(|property| !members.contains_key(property.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                out.push(self.keyword_failure(
                    FailureKind::DependentRequired {
                        trigger: trigger.clone(),
                        missing,
                    },
                    object,
                    "dependentRequired",
                    instance,
                ));
            }
        }
    }

    pub(crate) fn check_dependent_schemas(
        &self,
        object: &ObjectNode,
        dependencies: &IndexMap<String, SchemaId>,
        instance: &Value,
        depth: usize,
        out: &mut Vec<ValidationFailure>,
    ) {
        let Some(members) = instance.as_object() else {
            return;
        };
        let mut failed = Vec::new();
        let mut causes = Vec::new();
        for (trigger, schema) in dependencies {
            if !members.contains_key(trigger.as_str()) {
                continue;
            }
            // The dependent schema applies to the whole object.
            if let Some(failure) = self.visit(*schema, instance, depth + 1) {
                failed.push(trigger.clone());
                causes.push(failure);
            }
        }
        if !causes.is_empty() {
            out.push(
                self.keyword_failure(
                    FailureKind::DependentSchemas { failed },
                    object,
                    "dependentSchemas",
                    instance,
                )
                .with_causes(causes),
            );
        }
    }
}
