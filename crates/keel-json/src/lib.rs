#![doc = include_str!("../README.md")]

mod error;

pub use error::{JsonToValueError, ValueToJsonError};

use keel_value::{Number, Pointer, SourceLocation, Value, ValueContent};
use serde_json::Value as JsonValue;

/// Convert a parsed `serde_json` tree into the engine's value model.
///
/// `document` names the source (a file name, a URI) and ends up in every
/// node's location; the pointer part is synthesized during the walk.
pub fn json_to_value(json: &JsonValue, document: Option<&str>) -> Result<Value, JsonToValueError> {
    convert_json(json, document, Pointer::root())
}

fn convert_json(
    json: &JsonValue,
    document: Option<&str>,
    pointer: Pointer,
) -> Result<Value, JsonToValueError> {
    let content = match json {
        JsonValue::Null => ValueContent::Null,
        JsonValue::Bool(value) => ValueContent::Bool(*value),
        JsonValue::Number(number) => ValueContent::Number(convert_number(number, &pointer)?),
        JsonValue::String(text) => ValueContent::String(text.clone()),
        JsonValue::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                converted.push(convert_json(item, document, pointer.child_index(index))?);
            }
            ValueContent::Array(converted)
        }
        JsonValue::Object(members) => {
            let mut converted = indexmap::IndexMap::with_capacity(members.len());
            for (key, member) in members {
                converted.insert(
                    key.clone(),
                    convert_json(member, document, pointer.child(key.as_str()))?,
                );
            }
            ValueContent::Object(converted)
        }
    };
    let location = SourceLocation::new(document.map(str::to_string), pointer);
    Ok(Value::new(content, location))
}

fn convert_number(
    number: &serde_json::Number,
    pointer: &Pointer,
) -> Result<Number, JsonToValueError> {
    if let Some(integer) = number.as_i64() {
        return Ok(Number::from(integer));
    }
    if let Some(integer) = number.as_u64() {
        return Ok(Number::from(integer));
    }
    number
        .as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| JsonToValueError::NonFiniteNumber {
            pointer: pointer.to_string(),
        })
}

/// Convert a value back into a `serde_json` tree, dropping locations.
///
/// Integers that fit `i64`/`u64` stay integers; other numbers narrow to
/// `f64`, and numbers outside even that range are an error rather than a
/// silent infinity.
pub fn value_to_json(value: &Value) -> Result<JsonValue, ValueToJsonError> {
    Ok(match value.content() {
        ValueContent::Null => JsonValue::Null,
        ValueContent::Bool(b) => JsonValue::Bool(*b),
        ValueContent::Number(number) => JsonValue::Number(export_number(number)?),
        ValueContent::String(text) => JsonValue::String(text.clone()),
        ValueContent::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        ValueContent::Object(members) => {
            let mut out = serde_json::Map::with_capacity(members.len());
            for (key, member) in members {
                out.insert(key.clone(), value_to_json(member)?);
            }
            JsonValue::Object(out)
        }
    })
}

fn export_number(number: &Number) -> Result<serde_json::Number, ValueToJsonError> {
    if let Some(integer) = number.as_i64() {
        return Ok(serde_json::Number::from(integer));
    }
    if let Some(integer) = number.as_u64() {
        return Ok(serde_json::Number::from(integer));
    }
    number
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| ValueToJsonError::NumberOutOfRange {
            number: number.to_string(),
        })
}
