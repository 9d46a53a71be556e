use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JsonToValueError {
    /// `serde_json::Value` built programmatically can hold numbers no
    /// JSON document can express.
    #[error("non-finite number at {pointer}")]
    NonFiniteNumber { pointer: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueToJsonError {
    #[error("cannot represent {number} as a JSON number")]
    NumberOutOfRange { number: String },
}
