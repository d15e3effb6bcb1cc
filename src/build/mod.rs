//! Instantiation of resolved graphs.
pub mod components;
pub mod context;
pub(crate) mod engine;

pub use components::ComponentMap;
pub use context::{BuildFailure, ConstructionContext, ConstructionError};
