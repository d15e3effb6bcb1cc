//! Reasons a node could not be resolved. Recorded in error nodes, never returned.

use crate::convert::ConversionError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ResolutionError {
    #[error("no value for parameter '{parameter}' of type '{type_name}'")]
    MissingArgument { parameter: String, type_name: String },

    #[error("no configuration object supplied for parameter '{parameter}' of type '{type_name}'")]
    MissingConfig { parameter: String, type_name: String },

    #[error("argument {display} for parameter '{parameter}' is a '{actual}', expected '{expected}'")]
    IncompatibleArgumentType {
        parameter: String,
        expected: String,
        actual: String,
        display: String,
    },

    #[error("argument for parameter '{parameter}' could not be converted: {source}")]
    ArgumentConversion {
        parameter: String,
        text: String,
        source: ConversionError,
    },

    #[error("'{implementation}' is not an implementation of '{required}'")]
    InvalidImplementation { required: String, implementation: String },

    #[error("'{implementation}' must have exactly one eligible constructor, found {candidates}")]
    AmbiguousConstructor { implementation: String, candidates: usize },

    #[error("no implementation bound or registered for '{required}'")]
    NoImplementation { required: String },

    #[error("dependency cycle: {path}")]
    CyclicDependency { path: String },

    #[error("resolution of '{required}' nested deeper than {max_depth} levels")]
    DepthLimitExceeded { required: String, max_depth: usize },
}

impl ResolutionError {
    /// Short label used in pretty-printed trees.
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionError::MissingArgument { .. } => "missing argument",
            ResolutionError::MissingConfig { .. } => "missing config",
            ResolutionError::IncompatibleArgumentType { .. } => "incompatible argument type",
            ResolutionError::ArgumentConversion { .. } => "argument conversion error",
            ResolutionError::InvalidImplementation { .. } => "invalid implementation",
            ResolutionError::AmbiguousConstructor { .. } => "ambiguous constructor",
            ResolutionError::NoImplementation { .. } => "no implementation",
            ResolutionError::CyclicDependency { .. } => "cyclic dependency",
            ResolutionError::DepthLimitExceeded { .. } => "depth limit exceeded",
        }
    }
}
