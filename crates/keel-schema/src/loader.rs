//! Schema compilation.
//!
//! The loader turns a raw parsed [`Value`] into a fully linked
//! [`Schema`] arena in two passes. The first pass walks the document,
//! decodes every recognized keyword into its typed payload, and registers
//! each subschema under every identity it carries (`$id`, `$anchor`, and
//! its JSON-pointer position). `$ref` keywords are recorded as deferred
//! edges, because forward and circular references are legal. The second
//! pass patches those edges against the identity index, consulting the
//! pluggable [`SchemaResolver`] for documents outside the local one.
//!
//! Every error here is fatal: either the whole document compiles, or no
//! schema is returned.

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use keel_value::{Number, Pointer, SourceLocation, Value, ValueContent, ValueKind};
use url::Url;

use crate::identity;
use crate::schema::{Keyword, ObjectNode, Pattern, Schema, SchemaId, SchemaNode, SimpleType, TypeSet};

/// Source of schema documents referenced outside the loaded document.
///
/// The loader calls this with the document part of an unresolved
/// identity (no fragment). Transport is the implementor's business; the
/// engine only defines the contract.
pub trait SchemaResolver {
    fn resolve(&self, identity: &str) -> Result<Value, ResolveNotFound>;
}

/// The default resolver: every lookup misses, so any reference outside
/// the local document fails the load.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResolver;

impl SchemaResolver for NoResolver {
    fn resolve(&self, identity: &str) -> Result<Value, ResolveNotFound> {
        Err(ResolveNotFound {
            identity: identity.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no schema document found for identity {identity:?}")]
pub struct ResolveNotFound {
    pub identity: String,
}

/// Errors that abort schema compilation. No partial schema escapes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("{location}: {keyword:?} expects {expected}, found {actual}")]
    MalformedKeyword {
        keyword: String,
        expected: &'static str,
        actual: ValueKind,
        location: SourceLocation,
    },

    #[error("{location}: unknown type name {name:?}")]
    UnknownTypeName { name: String, location: SourceLocation },

    #[error("{location}: subschema must be an object or a boolean, found {actual}")]
    InvalidSubschema {
        actual: ValueKind,
        location: SourceLocation,
    },

    #[error("{location}: invalid regular expression {pattern:?} in {keyword:?}: {message}")]
    InvalidPattern {
        keyword: String,
        pattern: String,
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: duplicate identity {identity:?}")]
    DuplicateIdentity {
        identity: String,
        location: SourceLocation,
    },

    #[error("{location}: cannot resolve identity {identity:?}: {message}")]
    InvalidIdentity {
        identity: String,
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: unresolvable reference {reference:?}")]
    UnresolvedReference {
        reference: String,
        location: SourceLocation,
    },
}

/// Compile a schema document with the default configuration: no
/// caller-supplied base identity, no external resolver.
pub fn compile(document: &Value) -> Result<Schema, SchemaLoadError> {
    SchemaLoader::new().load(document)
}

/// Configurable schema compiler.
pub struct SchemaLoader<'r> {
    base_uri: Option<String>,
    resolver: &'r dyn SchemaResolver,
}

impl Default for SchemaLoader<'static> {
    fn default() -> Self {
        SchemaLoader::new()
    }
}

impl SchemaLoader<'static> {
    pub fn new() -> SchemaLoader<'static> {
        SchemaLoader {
            base_uri: None,
            resolver: &NoResolver,
        }
    }
}

impl<'r> SchemaLoader<'r> {
    /// Base identity for resolving relative `$id`/`$ref` values.
    /// Defaults to [`identity::DEFAULT_BASE_URI`].
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> SchemaLoader<'r> {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_resolver<'n>(self, resolver: &'n dyn SchemaResolver) -> SchemaLoader<'n> {
        SchemaLoader {
            base_uri: self.base_uri,
            resolver,
        }
    }

    /// Compile `document` into an immutable, fully linked [`Schema`].
    pub fn load(&self, document: &Value) -> Result<Schema, SchemaLoadError> {
        let base = match &self.base_uri {
            Some(uri) => Url::parse(uri).map_err(|error| SchemaLoadError::InvalidIdentity {
                identity: uri.clone(),
                message: error.to_string(),
                location: document.location().clone(),
            })?,
            None => identity::DEFAULT_BASE.clone(),
        };
        let mut state = LoaderState::default();
        let root_key = identity::normalize(base.clone());
        state.documents.insert(root_key.clone(), document.clone());
        state.walked.insert(root_key);

        let root = self.load_subschema(&mut state, document, &base, &Pointer::root())?;
        self.resolve_pending(&mut state)?;
        Ok(Schema::from_parts(state.nodes, root))
    }

    fn load_subschema(
        &self,
        state: &mut LoaderState,
        value: &Value,
        base: &Url,
        pointer: &Pointer,
    ) -> Result<SchemaId, SchemaLoadError> {
        // A position may be reached twice when reference resolution walks
        // into raw content; the node built first wins.
        if let Some(&existing) = state.index.get(&identity::pointer_identity(base, pointer)) {
            return Ok(existing);
        }
        match value.content() {
            ValueContent::Bool(allow) => {
                let id = state.push(SchemaNode::Boolean {
                    allow: *allow,
                    location: value.location().clone(),
                });
                state.register(identity::pointer_identity(base, pointer), id, value.location())?;
                Ok(id)
            }
            ValueContent::Object(_) => self.load_object(state, value, base, pointer),
            _ => Err(SchemaLoadError::InvalidSubschema {
                actual: value.kind(),
                location: value.location().clone(),
            }),
        }
    }

    fn load_object(
        &self,
        state: &mut LoaderState,
        value: &Value,
        base: &Url,
        pointer: &Pointer,
    ) -> Result<SchemaId, SchemaLoadError> {
        let members = match value.content() {
            ValueContent::Object(members) => members,
            _ => unreachable!("load_object called on a non-object"),
        };

        // Reserve the arena slot first; the real node is written once all
        // keywords are decoded.
        let id = state.push(SchemaNode::Boolean {
            allow: true,
            location: value.location().clone(),
        });
        state.register(identity::pointer_identity(base, pointer), id, value.location())?;

        // `$id` opens a new resource scope: children resolve identifiers
        // against it and their pointer identities restart at its root.
        let mut scope = base.clone();
        let mut scope_pointer = pointer.clone();
        if let Some(id_value) = members.get("$id") {
            let id_text = expect_str("$id", id_value)?;
            let resource = scope.join(id_text).map_err(|error| SchemaLoadError::InvalidIdentity {
                identity: id_text.to_string(),
                message: error.to_string(),
                location: id_value.location().clone(),
            })?;
            let resource_key = identity::normalize(resource.clone());
            state.register(resource_key.clone(), id, id_value.location())?;
            state.documents.entry(resource_key.clone()).or_insert_with(|| value.clone());
            state.walked.insert(resource_key);
            scope = resource;
            scope_pointer = Pointer::root();
        }
        if let Some(anchor_value) = members.get("$anchor") {
            let anchor = expect_str("$anchor", anchor_value)?;
            state.register(
                identity::anchor_identity(&scope, anchor),
                id,
                anchor_value.location(),
            )?;
        }

        let mut keywords = Vec::new();
        let mut unprocessed = IndexMap::new();

        for (name, member) in members {
            match name.as_str() {
                "$id" | "$anchor" => {}
                "$defs" | "definitions" => {
                    let defs = expect_object(name, member)?;
                    for (def_name, def_value) in defs {
                        self.load_subschema(
                            state,
                            def_value,
                            &scope,
                            &scope_pointer.child(name.as_str()).child(def_name.as_str()),
                        )?;
                    }
                }
                "$ref" => {
                    let reference = expect_str(name, member)?;
                    let target_identity = identity::resolve(&scope, reference).map_err(|error| {
                        SchemaLoadError::InvalidIdentity {
                            identity: reference.to_string(),
                            message: error.to_string(),
                            location: member.location().clone(),
                        }
                    })?;
                    state.pending.push(PendingRef {
                        node: id,
                        keyword_index: keywords.len(),
                        identity: target_identity,
                        reference: reference.to_string(),
                        location: member.location().clone(),
                    });
                    keywords.push(Keyword::Ref {
                        reference: reference.to_string(),
                        target: SchemaId::UNRESOLVED,
                    });
                }
                "type" => keywords.push(Keyword::Type(decode_type_set(member)?)),
                "const" => keywords.push(Keyword::Const(member.clone())),
                "enum" => {
                    let candidates = expect_array(name, member)?;
                    keywords.push(Keyword::Enum(candidates.to_vec()));
                }
                "minimum" => keywords.push(Keyword::Minimum(expect_number(name, member)?.clone())),
                "maximum" => keywords.push(Keyword::Maximum(expect_number(name, member)?.clone())),
                "exclusiveMinimum" => {
                    keywords.push(Keyword::ExclusiveMinimum(expect_number(name, member)?.clone()))
                }
                "exclusiveMaximum" => {
                    keywords.push(Keyword::ExclusiveMaximum(expect_number(name, member)?.clone()))
                }
                "multipleOf" => keywords.push(Keyword::MultipleOf(expect_number(name, member)?.clone())),
                "minLength" => keywords.push(Keyword::MinLength(expect_u64(name, member)?)),
                "maxLength" => keywords.push(Keyword::MaxLength(expect_u64(name, member)?)),
                "pattern" => {
                    let source = expect_str(name, member)?;
                    keywords.push(Keyword::Pattern(compile_pattern(name, source, member)?));
                }
                "format" => keywords.push(Keyword::Format(expect_str(name, member)?.to_string())),
                "items" => match member.content() {
                    // Legacy positional form: an array of element schemas.
                    ValueContent::Array(elements) => {
                        let mut ids = Vec::with_capacity(elements.len());
                        for (index, element) in elements.iter().enumerate() {
                            ids.push(self.load_subschema(
                                state,
                                element,
                                &scope,
                                &scope_pointer.child("items").child_index(index),
                            )?);
                        }
                        keywords.push(Keyword::PrefixItems(ids));
                    }
                    _ => {
                        let schema =
                            self.load_subschema(state, member, &scope, &scope_pointer.child("items"))?;
                        let prefix_len = members
                            .get("prefixItems")
                            .and_then(|prefix| prefix.as_array())
                            .map(|prefix| prefix.len())
                            .unwrap_or(0);
                        keywords.push(Keyword::Items { schema, prefix_len });
                    }
                },
                "prefixItems" => {
                    let elements = expect_array(name, member)?;
                    let mut ids = Vec::with_capacity(elements.len());
                    for (index, element) in elements.iter().enumerate() {
                        ids.push(self.load_subschema(
                            state,
                            element,
                            &scope,
                            &scope_pointer.child(name.as_str()).child_index(index),
                        )?);
                    }
                    keywords.push(Keyword::PrefixItems(ids));
                }
                "minItems" => keywords.push(Keyword::MinItems(expect_u64(name, member)?)),
                "maxItems" => keywords.push(Keyword::MaxItems(expect_u64(name, member)?)),
                "uniqueItems" => {
                    if expect_bool(name, member)? {
                        keywords.push(Keyword::UniqueItems);
                    }
                }
                "contains" => {
                    let schema =
                        self.load_subschema(state, member, &scope, &scope_pointer.child(name.as_str()))?;
                    let min = match members.get("minContains") {
                        Some(value) => expect_u64("minContains", value)?,
                        None => 1,
                    };
                    let max = members
                        .get("maxContains")
                        .map(|value| expect_u64("maxContains", value))
                        .transpose()?;
                    keywords.push(Keyword::Contains { schema, min, max });
                }
                // Consumed by "contains"; inert without it.
                "minContains" | "maxContains" => {
                    if !members.contains_key("contains") {
                        unprocessed.insert(name.clone(), member.clone());
                    }
                }
                "properties" => {
                    let properties = expect_object(name, member)?;
                    let mut ids = IndexMap::with_capacity(properties.len());
                    for (property, subschema) in properties {
                        let schema_id = self.load_subschema(
                            state,
                            subschema,
                            &scope,
                            &scope_pointer.child(name.as_str()).child(property.as_str()),
                        )?;
                        ids.insert(property.clone(), schema_id);
                    }
                    keywords.push(Keyword::Properties(ids));
                }
                "patternProperties" => {
                    let entries = expect_object(name, member)?;
                    let mut compiled = Vec::with_capacity(entries.len());
                    for (source, subschema) in entries {
                        let pattern = compile_pattern(name, source, member)?;
                        let schema_id = self.load_subschema(
                            state,
                            subschema,
                            &scope,
                            &scope_pointer.child(name.as_str()).child(source.as_str()),
                        )?;
                        compiled.push((pattern, schema_id));
                    }
                    keywords.push(Keyword::PatternProperties(compiled));
                }
                "additionalProperties" => {
                    let schema =
                        self.load_subschema(state, member, &scope, &scope_pointer.child(name.as_str()))?;
                    keywords.push(Keyword::AdditionalProperties(schema));
                }
                "required" => keywords.push(Keyword::Required(decode_string_array(name, member)?)),
                "propertyNames" => {
                    let schema =
                        self.load_subschema(state, member, &scope, &scope_pointer.child(name.as_str()))?;
                    keywords.push(Keyword::PropertyNames(schema));
                }
                "minProperties" => keywords.push(Keyword::MinProperties(expect_u64(name, member)?)),
                "maxProperties" => keywords.push(Keyword::MaxProperties(expect_u64(name, member)?)),
                "dependentRequired" => {
                    let entries = expect_object(name, member)?;
                    let mut dependencies = IndexMap::with_capacity(entries.len());
                    for (property, required) in entries {
                        dependencies.insert(property.clone(), decode_string_array(name, required)?);
                    }
                    keywords.push(Keyword::DependentRequired(dependencies));
                }
                "dependentSchemas" => {
                    let entries = expect_object(name, member)?;
                    let mut dependencies = IndexMap::with_capacity(entries.len());
                    for (property, subschema) in entries {
                        let schema_id = self.load_subschema(
                            state,
                            subschema,
                            &scope,
                            &scope_pointer.child(name.as_str()).child(property.as_str()),
                        )?;
                        dependencies.insert(property.clone(), schema_id);
                    }
                    keywords.push(Keyword::DependentSchemas(dependencies));
                }
                "allOf" | "anyOf" | "oneOf" => {
                    let branches = expect_array(name, member)?;
                    let mut ids = Vec::with_capacity(branches.len());
                    for (index, branch) in branches.iter().enumerate() {
                        ids.push(self.load_subschema(
                            state,
                            branch,
                            &scope,
                            &scope_pointer.child(name.as_str()).child_index(index),
                        )?);
                    }
                    keywords.push(match name.as_str() {
                        "allOf" => Keyword::AllOf(ids),
                        "anyOf" => Keyword::AnyOf(ids),
                        _ => Keyword::OneOf(ids),
                    });
                }
                "not" => {
                    let schema =
                        self.load_subschema(state, member, &scope, &scope_pointer.child(name.as_str()))?;
                    keywords.push(Keyword::Not(schema));
                }
                "if" => {
                    let condition =
                        self.load_subschema(state, member, &scope, &scope_pointer.child("if"))?;
                    let then = members
                        .get("then")
                        .map(|value| self.load_subschema(state, value, &scope, &scope_pointer.child("then")))
                        .transpose()?;
                    let otherwise = members
                        .get("else")
                        .map(|value| self.load_subschema(state, value, &scope, &scope_pointer.child("else")))
                        .transpose()?;
                    keywords.push(Keyword::IfThenElse {
                        condition,
                        then,
                        otherwise,
                    });
                }
                // Consumed by "if"; inert without it.
                "then" | "else" => {
                    if !members.contains_key("if") {
                        unprocessed.insert(name.clone(), member.clone());
                    }
                }
                "readOnly" => {
                    if expect_bool(name, member)? {
                        keywords.push(Keyword::ReadOnly);
                    }
                }
                "writeOnly" => {
                    if expect_bool(name, member)? {
                        keywords.push(Keyword::WriteOnly);
                    }
                }
                _ => {
                    unprocessed.insert(name.clone(), member.clone());
                }
            }
        }

        state.nodes[id.0] = SchemaNode::Object(ObjectNode {
            location: value.location().clone(),
            keywords,
            unprocessed,
        });
        Ok(id)
    }

    /// Patch every deferred `$ref` edge. Identities not present in the
    /// index fall back to raw-document pointer evaluation, then to the
    /// external resolver; a final miss is fatal.
    fn resolve_pending(&self, state: &mut LoaderState) -> Result<(), SchemaLoadError> {
        while let Some(pending) = state.pending.pop() {
            if let Some(&target) = state.index.get(&pending.identity) {
                patch(state, &pending, target);
                continue;
            }

            let (document_part, fragment) = identity::split_fragment(&pending.identity);
            let document_key = document_part.to_string();

            let unresolved = || SchemaLoadError::UnresolvedReference {
                reference: pending.reference.clone(),
                location: pending.location.clone(),
            };

            let document = match state.documents.get(&document_key) {
                Some(existing) => existing.clone(),
                None => {
                    let fetched = self
                        .resolver
                        .resolve(&document_key)
                        .map_err(|_| unresolved())?;
                    state.documents.insert(document_key.clone(), fetched.clone());
                    fetched
                }
            };
            if !state.walked.contains(&document_key) {
                state.walked.insert(document_key.clone());
                let base = parse_identity_url(&document_key, &pending)?;
                self.load_subschema(state, &document, &base, &Pointer::root())?;
                // Retry now that the document's identities are indexed.
                state.pending.push(pending);
                continue;
            }

            // The containing document is loaded but the identity is still
            // unknown: only a pointer into raw content can satisfy it.
            let Some(fragment) = fragment else {
                return Err(unresolved());
            };
            if !fragment.is_empty() && !fragment.starts_with('/') {
                return Err(unresolved());
            }
            let pointer =
                Pointer::parse(&identity::percent_decode(fragment)).map_err(|_| unresolved())?;
            let Some(target_value) = document.lookup(&pointer) else {
                return Err(unresolved());
            };
            let base = parse_identity_url(&document_key, &pending)?;
            let target = self.load_subschema(state, target_value, &base, &pointer)?;
            patch(state, &pending, target);
        }
        Ok(())
    }
}

#[derive(Default)]
struct LoaderState {
    nodes: Vec<SchemaNode>,
    /// Absolute identity -> arena handle.
    index: AHashMap<String, SchemaId>,
    pending: Vec<PendingRef>,
    /// Raw documents and `$id` resources, for pointer fallback and
    /// resolver results.
    documents: AHashMap<String, Value>,
    /// Document identities whose content has been walked already.
    walked: AHashSet<String>,
}

impl LoaderState {
    fn push(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn register(
        &mut self,
        identity: String,
        id: SchemaId,
        location: &SourceLocation,
    ) -> Result<(), SchemaLoadError> {
        match self.index.entry(identity) {
            std::collections::hash_map::Entry::Occupied(existing) => {
                if *existing.get() == id {
                    Ok(())
                } else {
                    Err(SchemaLoadError::DuplicateIdentity {
                        identity: existing.key().clone(),
                        location: location.clone(),
                    })
                }
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }
}

struct PendingRef {
    node: SchemaId,
    keyword_index: usize,
    identity: String,
    reference: String,
    location: SourceLocation,
}

fn patch(state: &mut LoaderState, pending: &PendingRef, target: SchemaId) {
    if let SchemaNode::Object(object) = &mut state.nodes[pending.node.0]
        && let Some(Keyword::Ref { target: slot, .. }) = object.keywords.get_mut(pending.keyword_index)
    {
        *slot = target;
    }
}

fn parse_identity_url(identity: &str, pending: &PendingRef) -> Result<Url, SchemaLoadError> {
    Url::parse(identity).map_err(|error| SchemaLoadError::InvalidIdentity {
        identity: identity.to_string(),
        message: error.to_string(),
        location: pending.location.clone(),
    })
}

fn malformed(keyword: &str, expected: &'static str, value: &Value) -> SchemaLoadError {
    SchemaLoadError::MalformedKeyword {
        keyword: keyword.to_string(),
        expected,
        actual: value.kind(),
        location: value.location().clone(),
    }
}

fn expect_str<'a>(keyword: &str, value: &'a Value) -> Result<&'a str, SchemaLoadError> {
    value.as_str().ok_or_else(|| malformed(keyword, "a string", value))
}

fn expect_bool(keyword: &str, value: &Value) -> Result<bool, SchemaLoadError> {
    value.as_bool().ok_or_else(|| malformed(keyword, "a boolean", value))
}

fn expect_number<'a>(keyword: &str, value: &'a Value) -> Result<&'a Number, SchemaLoadError> {
    value.as_number().ok_or_else(|| malformed(keyword, "a number", value))
}

fn expect_u64(keyword: &str, value: &Value) -> Result<u64, SchemaLoadError> {
    value
        .as_number()
        .and_then(|number| number.as_u64())
        .ok_or_else(|| malformed(keyword, "a non-negative integer", value))
}

fn expect_array<'a>(keyword: &str, value: &'a Value) -> Result<&'a [Value], SchemaLoadError> {
    value.as_array().ok_or_else(|| malformed(keyword, "an array", value))
}

fn expect_object<'a>(
    keyword: &str,
    value: &'a Value,
) -> Result<&'a IndexMap<String, Value>, SchemaLoadError> {
    value.as_object().ok_or_else(|| malformed(keyword, "an object", value))
}

fn decode_string_array(keyword: &str, value: &Value) -> Result<Vec<String>, SchemaLoadError> {
    expect_array(keyword, value)?
        .iter()
        .map(|item| expect_str(keyword, item).map(str::to_string))
        .collect()
}

fn decode_type_set(value: &Value) -> Result<TypeSet, SchemaLoadError> {
    let decode_name = |item: &Value| -> Result<SimpleType, SchemaLoadError> {
        let name = expect_str("type", item)?;
        SimpleType::from_name(name).ok_or_else(|| SchemaLoadError::UnknownTypeName {
            name: name.to_string(),
            location: item.location().clone(),
        })
    };
    match value.content() {
        ValueContent::String(_) => Ok(TypeSet::new(vec![decode_name(value)?])),
        ValueContent::Array(items) => Ok(TypeSet::new(
            items.iter().map(decode_name).collect::<Result<_, _>>()?,
        )),
        _ => Err(malformed("type", "a type name or an array of type names", value)),
    }
}

fn compile_pattern(keyword: &str, source: &str, value: &Value) -> Result<Pattern, SchemaLoadError> {
    Pattern::compile(source).map_err(|error| SchemaLoadError::InvalidPattern {
        keyword: keyword.to_string(),
        pattern: source.to_string(),
        message: error.to_string(),
        location: value.location().clone(),
    })
}
