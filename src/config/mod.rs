//! Layered resolution configuration.
//!
//! A `Configuration` binds abstract types to implementations, supplies literal
//! constructor arguments and records config-level decorators. Every
//! `decorated_with` call returns a new layer pointing at the previous one.

pub mod builder;
pub mod settings;

pub use builder::ConfigBuilder;
pub use settings::ResolverSettings;

use crate::catalog::{Argument, Catalog, ConstructorSelection, TypeKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{0}' is not registered in the catalog")]
    UnknownComponent(String),
    #[error("'{0}' does not decorate any type: no capability is taken as a constructor parameter")]
    NotADecorator(String),
    #[error("'{implementation}' has no eligible constructor to decorate with")]
    NoEligibleConstructor { implementation: String },
}

#[derive(Default)]
pub(crate) struct Layer {
    pub(crate) implementations: HashMap<TypeKey, TypeKey>,
    pub(crate) arguments: HashMap<(TypeKey, String), Argument>,
    pub(crate) decorators: HashMap<TypeKey, TypeKey>,
    pub(crate) inner: Option<Configuration>,
}

/// An immutable, cheaply cloneable configuration layer.
#[derive(Clone)]
pub struct Configuration {
    layer: Arc<Layer>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::empty()
    }
}

impl Configuration {
    pub fn empty() -> Self {
        Self { layer: Arc::new(Layer::default()) }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub(crate) fn from_layer(layer: Layer) -> Self {
        Self { layer: Arc::new(layer) }
    }

    /// Identity of this layer, stable for the lifetime of the configuration.
    pub fn layer_id(&self) -> usize {
        Arc::as_ptr(&self.layer) as usize
    }

    /// The previous (less decorated) layer.
    pub fn inner(&self) -> Option<&Configuration> {
        self.layer.inner.as_ref()
    }

    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self), |c| c.inner()).count()
    }

    /// Bound implementation for `ty`, searching inner layers when unbound here.
    pub fn implementation_for(&self, ty: TypeKey) -> Option<TypeKey> {
        self.layers().find_map(|c| c.layer.implementations.get(&ty).copied())
    }

    /// Literal argument for `(implementation, parameter)`.
    pub fn argument(&self, implementation: TypeKey, parameter: &str) -> Option<&Argument> {
        let key = (implementation, parameter.to_string());
        self.layers().find_map(|c| c.layer.arguments.get(&key))
    }

    /// The decorator applied to `ty` at this layer only.
    pub fn decorator_for(&self, ty: TypeKey) -> Option<TypeKey> {
        self.layer.decorators.get(&ty).copied()
    }

    /// The nearest decorator of `ty`, with the layer its delegate resolves against.
    pub fn decoration_for(&self, ty: TypeKey) -> Option<(TypeKey, &Configuration)> {
        self.layers().find_map(|c| Some((c.decorator_for(ty)?, c.inner()?)))
    }

    /// Decorators wrapping `ty`, outermost first.
    pub fn decorator_chain(&self, ty: TypeKey) -> Vec<TypeKey> {
        self.layers().filter_map(|c| c.decorator_for(ty)).collect()
    }

    fn layers(&self) -> impl Iterator<Item = &Configuration> {
        std::iter::successors(Some(self), |c| c.inner())
    }

    /// Layers decorator `D` on top of this configuration.
    pub fn decorated_with<D: ?Sized + 'static>(&self, catalog: &Catalog) -> Result<Configuration, ConfigError> {
        self.decorated_with_key(catalog, TypeKey::of::<D>())
    }

    /// Layers `decorator` on top of this configuration for every capability it
    /// both declares and takes as a constructor parameter.
    pub fn decorated_with_key(&self, catalog: &Catalog, decorator: TypeKey) -> Result<Configuration, ConfigError> {
        let component = catalog
            .get(decorator)
            .ok_or_else(|| ConfigError::UnknownComponent(decorator.short_name()))?;

        let constructor = match component.select_constructor() {
            ConstructorSelection::Selected(c) => c,
            _ => {
                return Err(ConfigError::NoEligibleConstructor {
                    implementation: decorator.short_name(),
                })
            }
        };

        let decorates: HashMap<TypeKey, TypeKey> = component
            .capabilities()
            .into_iter()
            .filter(|cap| constructor.parameters().iter().any(|p| p.type_key() == *cap))
            .map(|cap| (cap, decorator))
            .collect();

        if decorates.is_empty() {
            return Err(ConfigError::NotADecorator(decorator.short_name()));
        }

        debug!(decorator = %decorator, targets = decorates.len(), depth = self.depth() + 1, "decorated configuration");
        Ok(Self::from_layer(Layer {
            decorators: decorates,
            inner: Some(self.clone()),
            ..Layer::default()
        }))
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decorators: Vec<_> = self.layer.decorators.iter().collect();
        decorators.sort();
        f.debug_struct("Configuration")
            .field("implementations", &self.layer.implementations.len())
            .field("arguments", &self.layer.arguments.len())
            .field("decorators", &decorators)
            .field("depth", &self.depth())
            .finish()
    }
}
