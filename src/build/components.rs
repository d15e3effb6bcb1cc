use crate::catalog::{TypeKey, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Pre-built infrastructure singletons keyed by the type they are injected as.
#[derive(Debug, Clone, Default)]
pub struct ComponentMap {
    components: HashMap<TypeKey, Value>,
}

impl ComponentMap {
    pub fn empty() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.components.len() }
    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    /// Adds `component` under type `T`, which may be a trait object.
    pub fn with<T: ?Sized + Send + Sync + 'static>(self, component: Arc<T>) -> Self {
        self.with_value(Value::new(component))
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.components.insert(value.type_key(), value);
        self
    }

    pub fn get(&self, ty: TypeKey) -> Option<&Value> {
        self.components.get(&ty)
    }

    pub fn get_typed<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.get(TypeKey::of::<T>())?.downcast::<T>()
    }

    /// The types available for injection, as declared to the resolver.
    pub fn component_types(&self) -> HashSet<TypeKey> {
        self.components.keys().copied().collect()
    }
}
