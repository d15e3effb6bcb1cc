//! The component catalog: every implementation type the resolver may construct,
//! with its constructors, capabilities and provider declaration.

pub mod component;
pub mod key;
pub mod value;

pub use component::{
    Arguments, Component, ComponentDescriptor, Constructor, ConstructorDescriptor,
    ConstructorSelection, Parameter, ProviderDescriptor, Upcast, Visibility,
};
pub use key::TypeKey;
pub use value::{Argument, BoxError, Value};

use std::collections::HashMap;
use tracing::warn;

/// Immutable registration table, shared read-only across resolutions.
#[derive(Debug, Default)]
pub struct Catalog {
    components: HashMap<TypeKey, ComponentDescriptor>,
    // product type -> provider implementation type
    providers: HashMap<TypeKey, TypeKey>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder { CatalogBuilder::default() }
    pub fn len(&self) -> usize { self.components.len() }
    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    pub fn get(&self, ty: TypeKey) -> Option<&ComponentDescriptor> {
        self.components.get(&ty)
    }

    pub fn contains(&self, ty: TypeKey) -> bool {
        self.components.contains_key(&ty)
    }

    /// The registered provider whose product is `ty`, if any.
    pub fn provider_for(&self, ty: TypeKey) -> Option<&ComponentDescriptor> {
        self.providers.get(&ty).and_then(|p| self.components.get(p))
    }

    pub fn is_config_object(&self, ty: TypeKey) -> bool {
        self.get(ty).map_or(false, ComponentDescriptor::is_config_object)
    }

    /// True if a value of type `from` may be used where `to` is required.
    pub fn satisfies(&self, from: TypeKey, to: TypeKey) -> bool {
        from == to || self.get(from).map_or(false, |c| c.implements(to))
    }

    /// Converts `value` to the required type, applying a declared capability
    /// upcast when the types differ.
    pub(crate) fn upcast(&self, value: &Value, to: TypeKey) -> Option<Value> {
        if value.type_key() == to {
            return Some(value.clone());
        }
        let cast = self.get(value.type_key())?.upcast(to)?;
        cast(value)
    }
}

#[derive(Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Adds a component. A second registration of the same type replaces the first.
    pub fn register<T: Send + Sync + 'static>(mut self, component: Component<T>) -> Self {
        let descriptor = component.into_descriptor();
        let key = descriptor.type_key();

        if let Some(provider) = descriptor.provider() {
            if let Some(previous) = self.catalog.providers.insert(provider.product(), key) {
                if previous != key {
                    warn!(product = %provider.product(), %previous, replacement = %key, "provider replaced");
                }
            }
        }
        if self.catalog.components.insert(key, descriptor).is_some() {
            warn!(component = %key, "component registered twice; keeping the latest");
        }
        self
    }

    pub fn build(self) -> Catalog {
        self.catalog
    }
}
