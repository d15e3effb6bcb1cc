//! Conversion of textual configuration values into typed arguments.

pub mod default;

pub use default::DefaultArgumentConverter;

use crate::catalog::{TypeKey, Value};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConversionError {
    #[error("no conversion from text to '{type_name}'")]
    Unsupported { type_name: String },
    #[error("cannot convert '{text}' to '{type_name}': {reason}")]
    Invalid { type_name: String, text: String, reason: String },
}

/// Converts text to a value of a requested type.
pub trait ArgumentConverter: Send + Sync {
    fn is_convertible(&self, ty: TypeKey) -> bool;

    fn convert(&self, ty: TypeKey, text: &str) -> Result<Value, ConversionError>;
}
