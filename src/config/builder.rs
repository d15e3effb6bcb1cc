use super::{Configuration, Layer};
use crate::catalog::{Argument, TypeKey};

/// Assembles the base (undecorated) configuration layer.
#[derive(Default)]
pub struct ConfigBuilder {
    layer: Layer,
}

impl ConfigBuilder {
    /// Binds abstract type `I` to implementation `C`.
    pub fn implementation<I: ?Sized + 'static, C: 'static>(self) -> Self {
        self.bind(TypeKey::of::<I>(), TypeKey::of::<C>())
    }

    pub fn bind(mut self, ty: TypeKey, implementation: TypeKey) -> Self {
        self.layer.implementations.insert(ty, implementation);
        self
    }

    /// Supplies a literal for parameter `name` of implementation `C`.
    pub fn argument<C: 'static>(self, name: impl Into<String>, argument: Argument) -> Self {
        self.argument_for(TypeKey::of::<C>(), name, argument)
    }

    pub fn argument_for(mut self, implementation: TypeKey, name: impl Into<String>, argument: Argument) -> Self {
        self.layer.arguments.insert((implementation, name.into()), argument);
        self
    }

    pub fn build(self) -> Configuration {
        Configuration::from_layer(self.layer)
    }
}
