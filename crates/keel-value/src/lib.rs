#![doc = include_str!("../README.md")]

pub mod number;
pub mod pointer;

/// A type-safe data-type for parsed JSON values.
pub mod value;

pub use number::{Number, NumberParseError};
pub use pointer::{Pointer, PointerParseError, SourceLocation};
pub use value::{TypeMismatch, Value, ValueContent, ValueKind};
