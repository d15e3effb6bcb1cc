//! Configuration-driven function graph resolution.
//!
//! A request names a type and the output it produces. The resolver walks
//! constructor dependencies through the component [`Catalog`], applying
//! implementation bindings, literal arguments and decorators from a layered
//! [`Configuration`]. Every defect is recorded as an error node instead of
//! aborting, so a [`GraphModel`] can report all of them at once before it is
//! built.

pub mod build;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod display;
pub mod graph;
pub mod metadata;
pub mod model;

#[cfg(test)]
pub(crate) mod testing;

pub use build::{BuildFailure, ComponentMap, ConstructionContext, ConstructionError};
pub use catalog::{Argument, Arguments, BoxError, Catalog, Component, Constructor, TypeKey, Value};
pub use config::{ConfigError, Configuration, ResolverSettings};
pub use convert::{ArgumentConverter, ConversionError, DefaultArgumentConverter};
pub use graph::{Decoration, IdentityDecorator, NodeDecorator, NodeId, NodeKind, NodeView, ResolutionError};
pub use metadata::FunctionMetadata;
pub use model::{resolve, BuildResult, GraphModel, ModelError, Resolver};
