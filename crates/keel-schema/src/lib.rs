#![doc = include_str!("../README.md")]

pub mod failure;
mod format;
mod identity;
pub mod loader;
pub mod schema;
pub mod validate;

pub use failure::{FailureKind, ValidationFailure};
pub use identity::DEFAULT_BASE_URI;
pub use loader::{NoResolver, ResolveNotFound, SchemaLoadError, SchemaLoader, SchemaResolver, compile};
pub use schema::{Keyword, ObjectNode, Pattern, Schema, SchemaId, SchemaNode, SimpleType, TypeSet};
pub use validate::{ReadWriteContext, Validator, ValidatorConfig};
