//! The compiled, in-memory schema representation.
//!
//! A schema document compiles into an arena of [`SchemaNode`]s owned by
//! one [`Schema`]. Edges between subschemas are [`SchemaId`] handles into
//! the arena, never owned nesting, so `$ref` cycles (a schema referencing
//! an ancestor or itself) are plain data instead of an ownership problem.
//! The arena is immutable once the loader returns it.

use core::fmt;

use indexmap::IndexMap;
use keel_value::{Number, SourceLocation, Value};
use regex::Regex;

/// Handle of one subschema inside a [`Schema`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Sentinel used by the loader for `$ref` edges awaiting resolution.
    /// Never present in a successfully loaded [`Schema`].
    pub(crate) const UNRESOLVED: SchemaId = SchemaId(usize::MAX);
}

/// A compiled schema document: the arena of subschema nodes plus the
/// root handle. Built by the loader, immutable afterwards, reusable and
/// shareable across concurrent validation calls.
#[derive(Debug)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
    root: SchemaId,
}

impl Schema {
    pub(crate) fn from_parts(nodes: Vec<SchemaNode>, root: SchemaId) -> Schema {
        Schema { nodes, root }
    }

    pub fn root(&self) -> SchemaId {
        self.root
    }

    /// Number of subschema nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dereference a handle.
    ///
    /// Panics when the handle does not belong to this arena. A loaded
    /// schema only hands out valid ids, so hitting the panic means the
    /// loader produced an inconsistent graph, which is a bug in the
    /// loader rather than a user-facing condition.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        self.nodes
            .get(id.0)
            .unwrap_or_else(|| panic!("dangling schema handle {id:?}: loader produced an inconsistent graph"))
    }
}

/// One subschema: either a boolean schema or a keyword-bearing object.
#[derive(Debug)]
pub enum SchemaNode {
    /// `true` accepts every instance, `false` rejects every instance.
    Boolean { allow: bool, location: SourceLocation },
    Object(ObjectNode),
}

impl SchemaNode {
    pub fn location(&self) -> &SourceLocation {
        match self {
            SchemaNode::Boolean { location, .. } => location,
            SchemaNode::Object(object) => &object.location,
        }
    }
}

/// An object subschema: its decoded keywords plus everything the loader
/// did not recognize, stored opaquely and never validated against.
#[derive(Debug)]
pub struct ObjectNode {
    pub location: SourceLocation,
    pub keywords: Vec<Keyword>,
    /// Unrecognized keywords and annotation-only keywords (`title`,
    /// `$comment`, ...), kept for tooling but inert during validation.
    pub unprocessed: IndexMap<String, Value>,
}

impl ObjectNode {
    /// The property names covered by a `properties` keyword, if any.
    pub(crate) fn property_names(&self) -> Option<&IndexMap<String, SchemaId>> {
        self.keywords.iter().find_map(|keyword| match keyword {
            Keyword::Properties(members) => Some(members),
            _ => None,
        })
    }

    /// The compiled patterns of a `patternProperties` keyword, if any.
    pub(crate) fn property_patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.keywords
            .iter()
            .filter_map(|keyword| match keyword {
                Keyword::PatternProperties(entries) => Some(entries.iter().map(|(pattern, _)| pattern)),
                _ => None,
            })
            .flatten()
    }
}

/// One decoded keyword with its typed payload.
///
/// Payloads are decoded at load time so the validator's dispatch is an
/// exhaustive match instead of a by-name lookup.
#[derive(Debug)]
pub enum Keyword {
    /// Delegation to another subschema. The target is patched in by the
    /// loader's resolution pass; the reference text is kept for
    /// diagnostics.
    Ref { reference: String, target: SchemaId },
    Type(TypeSet),
    Const(Value),
    Enum(Vec<Value>),
    Minimum(Number),
    Maximum(Number),
    ExclusiveMinimum(Number),
    ExclusiveMaximum(Number),
    MultipleOf(Number),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Pattern),
    Format(String),
    /// Single-schema `items`, applied to every element past the
    /// `prefixItems` prefix (zero when there is none).
    Items { schema: SchemaId, prefix_len: usize },
    /// Positional element schemas: `prefixItems`, or the legacy array
    /// form of `items`.
    PrefixItems(Vec<SchemaId>),
    MinItems(u64),
    MaxItems(u64),
    /// Stored only when `uniqueItems` is `true`.
    UniqueItems,
    Contains {
        schema: SchemaId,
        min: u64,
        max: Option<u64>,
    },
    Properties(IndexMap<String, SchemaId>),
    PatternProperties(Vec<(Pattern, SchemaId)>),
    /// Applies only to members matched by neither `properties` nor
    /// `patternProperties` of the same object schema.
    AdditionalProperties(SchemaId),
    Required(Vec<String>),
    PropertyNames(SchemaId),
    MinProperties(u64),
    MaxProperties(u64),
    DependentRequired(IndexMap<String, Vec<String>>),
    DependentSchemas(IndexMap<String, SchemaId>),
    AllOf(Vec<SchemaId>),
    AnyOf(Vec<SchemaId>),
    OneOf(Vec<SchemaId>),
    Not(SchemaId),
    IfThenElse {
        condition: SchemaId,
        then: Option<SchemaId>,
        otherwise: Option<SchemaId>,
    },
    /// Stored only when `readOnly` is `true`.
    ReadOnly,
    /// Stored only when `writeOnly` is `true`.
    WriteOnly,
}

impl Keyword {
    /// The keyword name as written in the schema document, used for
    /// diagnostic pointers.
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Ref { .. } => "$ref",
            Keyword::Type(_) => "type",
            Keyword::Const(_) => "const",
            Keyword::Enum(_) => "enum",
            Keyword::Minimum(_) => "minimum",
            Keyword::Maximum(_) => "maximum",
            Keyword::ExclusiveMinimum(_) => "exclusiveMinimum",
            Keyword::ExclusiveMaximum(_) => "exclusiveMaximum",
            Keyword::MultipleOf(_) => "multipleOf",
            Keyword::MinLength(_) => "minLength",
            Keyword::MaxLength(_) => "maxLength",
            Keyword::Pattern(_) => "pattern",
            Keyword::Format(_) => "format",
            Keyword::Items { .. } => "items",
            Keyword::PrefixItems(_) => "prefixItems",
            Keyword::MinItems(_) => "minItems",
            Keyword::MaxItems(_) => "maxItems",
            Keyword::UniqueItems => "uniqueItems",
            Keyword::Contains { .. } => "contains",
            Keyword::Properties(_) => "properties",
            Keyword::PatternProperties(_) => "patternProperties",
            Keyword::AdditionalProperties(_) => "additionalProperties",
            Keyword::Required(_) => "required",
            Keyword::PropertyNames(_) => "propertyNames",
            Keyword::MinProperties(_) => "minProperties",
            Keyword::MaxProperties(_) => "maxProperties",
            Keyword::DependentRequired(_) => "dependentRequired",
            Keyword::DependentSchemas(_) => "dependentSchemas",
            Keyword::AllOf(_) => "allOf",
            Keyword::AnyOf(_) => "anyOf",
            Keyword::OneOf(_) => "oneOf",
            Keyword::Not(_) => "not",
            Keyword::IfThenElse { .. } => "if",
            Keyword::ReadOnly => "readOnly",
            Keyword::WriteOnly => "writeOnly",
        }
    }
}

/// One of the seven names the `type` keyword accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl SimpleType {
    pub fn from_name(name: &str) -> Option<SimpleType> {
        match name {
            "null" => Some(SimpleType::Null),
            "boolean" => Some(SimpleType::Boolean),
            "integer" => Some(SimpleType::Integer),
            "number" => Some(SimpleType::Number),
            "string" => Some(SimpleType::String),
            "array" => Some(SimpleType::Array),
            "object" => Some(SimpleType::Object),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SimpleType::Null => "null",
            SimpleType::Boolean => "boolean",
            SimpleType::Integer => "integer",
            SimpleType::Number => "number",
            SimpleType::String => "string",
            SimpleType::Array => "array",
            SimpleType::Object => "object",
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The declared type set of a `type` keyword (one name or several).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(Vec<SimpleType>);

impl TypeSet {
    pub(crate) fn new(types: Vec<SimpleType>) -> TypeSet {
        TypeSet(types)
    }

    pub fn types(&self) -> &[SimpleType] {
        &self.0
    }

    /// Whether an instance whose [`Value::type_name`] is `actual` is
    /// permitted. `integer` counts as a refinement of `number`.
    pub fn permits(&self, actual: &str) -> bool {
        self.0.iter().any(|declared| {
            declared.name() == actual || (*declared == SimpleType::Number && actual == "integer")
        })
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            types => {
                write!(f, "[")?;
                for (i, simple_type) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{simple_type}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A compiled `pattern` / `patternProperties` regex, keeping the source
/// text for diagnostics. Matching is a search anywhere in the string,
/// not a full match.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Pattern, regex::Error> {
        Ok(Pattern {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
