//! Node variants of a resolved function graph, and the global node decorator hook.

use super::error::ResolutionError;
use super::storage::NodeId;
use crate::build::ConstructionError;
use crate::catalog::{Argument, BoxError, ConstructorDescriptor, TypeKey, Upcast, Value};
use crate::catalog::component::ProvideFn;
use std::fmt;
use std::sync::Arc;

pub type DecorateFn = Arc<dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync>;

/// Where a parameter node's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentSource {
    Literal,
    Converted,
    Default,
}

/// The plan for producing one value.
#[derive(Clone)]
pub enum NodeKind {
    /// Built by invoking a constructor of `implementation`.
    Class {
        implementation: TypeKey,
        constructor: Arc<ConstructorDescriptor>,
        cast: Option<Upcast>,
    },
    /// Built by constructing `provider`, then asking it for its product.
    Provider {
        provider: TypeKey,
        product: TypeKey,
        constructor: Arc<ConstructorDescriptor>,
        provide: ProvideFn,
        cast: Option<Upcast>,
    },
    /// A configured, converted or default argument.
    Parameter {
        name: String,
        argument: Argument,
        source: ArgumentSource,
    },
    /// Looked up from the component map at build time.
    Infrastructure,
    /// Wraps its single dependency with a build-time transformation.
    Decorated { label: String, decoration: DecorateFn },
    Error {
        error: ResolutionError,
        /// The offending raw argument, when there was one.
        argument: Option<Argument>,
    },
}

impl NodeKind {
    pub fn is_error(&self) -> bool {
        matches!(self, NodeKind::Error { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self, NodeKind::Class { .. } | NodeKind::Provider { .. })
    }

    pub fn error(&self) -> Option<&ResolutionError> {
        match self {
            NodeKind::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// One-line description used by the pretty printer and reports.
    pub fn describe(&self, ty: TypeKey) -> String {
        match self {
            NodeKind::Class { implementation, .. } if *implementation == ty => format!("class {}", implementation),
            NodeKind::Class { implementation, .. } => format!("class {} for {}", implementation, ty),
            NodeKind::Provider { provider, product, .. } => format!("provider {} of {}", provider, product),
            NodeKind::Parameter { argument, source, .. } => match source {
                ArgumentSource::Literal => format!("value {}", argument.display()),
                ArgumentSource::Converted => format!("converted {} to {}", argument.display(), ty),
                ArgumentSource::Default => format!("default {}", argument.display()),
            },
            NodeKind::Infrastructure => format!("infrastructure {}", ty),
            NodeKind::Decorated { label, .. } => format!("decorated '{}' {}", label, ty),
            NodeKind::Error { error, .. } => format!("{}: {}", error.label(), error),
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Class { implementation, constructor, .. } => f
                .debug_struct("Class")
                .field("implementation", implementation)
                .field("parameters", &constructor.parameters())
                .finish(),
            NodeKind::Provider { provider, product, .. } => f
                .debug_struct("Provider")
                .field("provider", provider)
                .field("product", product)
                .finish(),
            NodeKind::Parameter { name, argument, source } => f
                .debug_struct("Parameter")
                .field("name", name)
                .field("argument", argument)
                .field("source", source)
                .finish(),
            NodeKind::Infrastructure => f.write_str("Infrastructure"),
            NodeKind::Decorated { label, .. } => f.debug_struct("Decorated").field("label", label).finish(),
            NodeKind::Error { error, argument } => f
                .debug_struct("Error")
                .field("error", error)
                .field("argument", argument)
                .finish(),
        }
    }
}

/// Read-only view of a freshly resolved node, handed to a [`NodeDecorator`].
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub ty: TypeKey,
    pub kind: &'a NodeKind,
}

/// A typed build-time wrapper for a node's value.
pub struct Decoration {
    pub(crate) label: String,
    pub(crate) decorate: DecorateFn,
}

impl Decoration {
    /// Wraps values of type `T`; the wrapper must produce the same type.
    pub fn new<T, F>(label: impl Into<String>, decorate: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let decorate: DecorateFn = Arc::new(move |value: Value| -> Result<Value, BoxError> {
            let inner = value.downcast::<T>().ok_or_else(|| ConstructionError::CastFailed {
                expected: TypeKey::of::<T>().short_name(),
                actual: value.type_key().short_name(),
            })?;
            decorate(inner).map(Value::new)
        });
        Self {
            label: label.into(),
            decorate,
        }
    }
}

/// Global hook applied to every class and provider node after resolution.
pub trait NodeDecorator: Send + Sync {
    /// Returns a decoration to wrap the node with, or `None` to leave it as is.
    fn decorate(&self, node: NodeView<'_>) -> Option<Decoration>;
}

/// Leaves every node untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDecorator;

impl NodeDecorator for IdentityDecorator {
    fn decorate(&self, _node: NodeView<'_>) -> Option<Decoration> {
        None
    }
}
