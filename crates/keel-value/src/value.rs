use core::fmt;

use indexmap::IndexMap;

use crate::number::Number;
use crate::pointer::{Pointer, SourceLocation};

/// The runtime type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// A strict accessor was called on the wrong variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: expected {expected}, found {actual}")]
pub struct TypeMismatch {
    pub expected: ValueKind,
    pub actual: ValueKind,
    pub location: SourceLocation,
}

/// The payload of a [`Value`].
///
/// Object members are insertion-ordered and unique by key; numbers are
/// exact decimals.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueContent {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// One node of a parsed JSON document: content plus the location it was
/// read from.
///
/// Values form an immutable tree. Equality is structural over the content
/// only; two values parsed from different positions compare equal when
/// their data does.
#[derive(Debug, Clone)]
pub struct Value {
    content: ValueContent,
    location: SourceLocation,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Value {
    pub fn new(content: ValueContent, location: SourceLocation) -> Value {
        Value { content, location }
    }

    pub fn null() -> Value {
        Value::new(ValueContent::Null, SourceLocation::unknown())
    }

    pub fn bool(value: bool) -> Value {
        Value::new(ValueContent::Bool(value), SourceLocation::unknown())
    }

    pub fn number(value: impl Into<Number>) -> Value {
        Value::new(ValueContent::Number(value.into()), SourceLocation::unknown())
    }

    pub fn string(value: impl Into<String>) -> Value {
        Value::new(ValueContent::String(value.into()), SourceLocation::unknown())
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Value {
        Value::new(
            ValueContent::Array(items.into_iter().collect()),
            SourceLocation::unknown(),
        )
    }

    pub fn object(members: impl IntoIterator<Item = (String, Value)>) -> Value {
        Value::new(
            ValueContent::Object(members.into_iter().collect()),
            SourceLocation::unknown(),
        )
    }

    pub fn content(&self) -> &ValueContent {
        &self.content
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn kind(&self) -> ValueKind {
        match &self.content {
            ValueContent::Null => ValueKind::Null,
            ValueContent::Bool(_) => ValueKind::Boolean,
            ValueContent::Number(_) => ValueKind::Number,
            ValueContent::String(_) => ValueKind::String,
            ValueContent::Array(_) => ValueKind::Array,
            ValueContent::Object(_) => ValueKind::Object,
        }
    }

    /// The type name as the `type` keyword sees it: whole numbers report
    /// as `integer`, everything else as its [`ValueKind`].
    pub fn type_name(&self) -> &'static str {
        match &self.content {
            ValueContent::Null => "null",
            ValueContent::Bool(_) => "boolean",
            ValueContent::Number(n) if n.is_integer() => "integer",
            ValueContent::Number(_) => "number",
            ValueContent::String(_) => "string",
            ValueContent::Array(_) => "array",
            ValueContent::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.content, ValueContent::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.content {
            ValueContent::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match &self.content {
            ValueContent::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.content {
            ValueContent::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match &self.content {
            ValueContent::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match &self.content {
            ValueContent::Object(members) => Some(members),
            _ => None,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> TypeMismatch {
        TypeMismatch {
            expected,
            actual: self.kind(),
            location: self.location.clone(),
        }
    }

    pub fn require_bool(&self) -> Result<bool, TypeMismatch> {
        self.as_bool().ok_or_else(|| self.mismatch(ValueKind::Boolean))
    }

    pub fn require_number(&self) -> Result<&Number, TypeMismatch> {
        self.as_number().ok_or_else(|| self.mismatch(ValueKind::Number))
    }

    pub fn require_str(&self) -> Result<&str, TypeMismatch> {
        self.as_str().ok_or_else(|| self.mismatch(ValueKind::String))
    }

    pub fn require_array(&self) -> Result<&[Value], TypeMismatch> {
        self.as_array().ok_or_else(|| self.mismatch(ValueKind::Array))
    }

    pub fn require_object(&self) -> Result<&IndexMap<String, Value>, TypeMismatch> {
        self.as_object().ok_or_else(|| self.mismatch(ValueKind::Object))
    }

    /// Walk a pointer down from this value. `None` when any reference
    /// token does not resolve.
    pub fn lookup(&self, pointer: &Pointer) -> Option<&Value> {
        let mut current = self;
        for segment in pointer.segments() {
            current = match current.content() {
                ValueContent::Object(members) => members.get(segment.as_str())?,
                ValueContent::Array(items) => {
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}
