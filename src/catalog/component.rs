//! Constructor and capability descriptors registered per implementation type.
//!
//! A `Component<T>` is the static stand-in for reflection: it lists the
//! constructors the resolver may call, the abstract types `T` can be used as,
//! and, for factories, the type it provides.

use super::key::TypeKey;
use super::value::{Argument, BoxError, Value};
use crate::build::ConstructionError;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Erased constructor: builds a value from the resolved arguments.
pub type Factory = Arc<dyn Fn(&Arguments) -> Result<Value, BoxError> + Send + Sync>;
/// Converts a value of an implementation type into one of its capabilities.
pub type Upcast = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
/// Turns a built provider instance into the product it provides.
pub type ProvideFn = Arc<dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// A named, typed constructor parameter.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    ty: TypeKey,
    default: Option<Argument>,
}

impl Parameter {
    pub fn new<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeKey::of::<T>(),
            default: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn default_value(&self) -> Option<&Argument> {
        self.default.as_ref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// The arguments handed to a constructor, in declaration order.
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    pub(crate) fn new(parameters: &[Parameter], values: Vec<Value>) -> Self {
        let entries = parameters
            .iter()
            .map(|p| p.name.clone())
            .zip(values)
            .collect();
        Self { entries }
    }

    /// Fetches the argument bound to the parameter `name`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ConstructionError> {
        let index = self
            .entries
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| ConstructionError::MissingArgument { parameter: name.to_string() })?;
        self.at(index)
    }

    /// Fetches the argument at a declaration position.
    pub fn at<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>, ConstructionError> {
        let (name, value) = self
            .entries
            .get(index)
            .ok_or_else(|| ConstructionError::MissingArgument { parameter: format!("#{}", index) })?;
        value.downcast::<T>().ok_or_else(|| ConstructionError::ArgumentType {
            parameter: name.clone(),
            expected: TypeKey::of::<T>().short_name(),
            actual: value.type_key().short_name(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A typed constructor declaration for `T`.
pub struct Constructor<T> {
    parameters: Vec<Parameter>,
    visibility: Visibility,
    injectable: bool,
    factory: Arc<dyn Fn(&Arguments) -> Result<T, BoxError> + Send + Sync>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters: Vec::new(),
            visibility: Visibility::Public,
            injectable: false,
            factory: Arc::new(factory),
        }
    }

    /// Appends a parameter; declaration order is resolution order.
    pub fn param<P: ?Sized + 'static>(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new::<P>(name));
        self
    }

    /// Appends a parameter that falls back to `default` when nothing else resolves it.
    pub fn param_or<P: fmt::Debug + Send + Sync + 'static>(mut self, name: impl Into<String>, default: P) -> Self {
        let mut parameter = Parameter::new::<P>(name);
        parameter.default = Some(Argument::new(default));
        self.parameters.push(parameter);
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Marks the constructor as the one to inject when several are public.
    pub fn injectable(mut self) -> Self {
        self.injectable = true;
        self
    }

    fn erase(self) -> ConstructorDescriptor {
        let factory = self.factory;
        ConstructorDescriptor {
            parameters: self.parameters,
            visibility: self.visibility,
            injectable: self.injectable,
            factory: Arc::new(move |args: &Arguments| -> Result<Value, BoxError> {
                factory(args).map(Value::of)
            }),
        }
    }
}

/// A type-erased constructor.
pub struct ConstructorDescriptor {
    parameters: Vec<Parameter>,
    visibility: Visibility,
    injectable: bool,
    factory: Factory,
}

impl ConstructorDescriptor {
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_injectable(&self) -> bool {
        self.injectable
    }

    pub(crate) fn invoke(&self, args: &Arguments) -> Result<Value, BoxError> {
        (self.factory)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("parameters", &self.parameters)
            .field("visibility", &self.visibility)
            .field("injectable", &self.injectable)
            .finish()
    }
}

/// What a provider component produces, and how.
#[derive(Clone)]
pub struct ProviderDescriptor {
    product: TypeKey,
    provide: ProvideFn,
}

impl ProviderDescriptor {
    pub fn product(&self) -> TypeKey {
        self.product
    }

    pub(crate) fn provide_fn(&self) -> &ProvideFn {
        &self.provide
    }
}

/// Outcome of constructor eligibility for one implementation type.
#[derive(Debug, Clone)]
pub enum ConstructorSelection {
    Selected(Arc<ConstructorDescriptor>),
    /// No public constructor at all.
    NoneAccessible,
    /// Several candidates and nothing to break the tie.
    Ambiguous(usize),
}

/// Typed builder for a component registration.
pub struct Component<T> {
    constructors: Vec<Arc<ConstructorDescriptor>>,
    capabilities: HashMap<TypeKey, Upcast>,
    provider: Option<ProviderDescriptor>,
    config_object: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Default for Component<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> Component<T> {
    pub fn new() -> Self {
        Self {
            constructors: Vec::new(),
            capabilities: HashMap::new(),
            provider: None,
            config_object: false,
            _marker: PhantomData,
        }
    }

    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.constructors.push(Arc::new(constructor.erase()));
        self
    }

    /// Declares that `T` can stand in for `I`.
    /// Example: `.implements::<dyn Pricer>(|this| this)`
    pub fn implements<I: ?Sized + Send + Sync + 'static>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self {
        let upcast: Upcast = Arc::new(move |value: &Value| -> Option<Value> {
            value.downcast::<T>().map(|this| Value::new(cast(this)))
        });
        self.capabilities.insert(TypeKey::of::<I>(), upcast);
        self
    }

    /// Declares `T` as a provider of `P`.
    pub fn provides<P, F>(mut self, provide: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&T) -> Result<Arc<P>, BoxError> + Send + Sync + 'static,
    {
        let provide: ProvideFn = Arc::new(move |value: &Value| -> Result<Value, BoxError> {
            let this = value.downcast::<T>().ok_or_else(|| ConstructionError::CastFailed {
                expected: TypeKey::of::<T>().short_name(),
                actual: value.type_key().short_name(),
            })?;
            provide(&this).map(Value::new)
        });
        self.provider = Some(ProviderDescriptor {
            product: TypeKey::of::<P>(),
            provide,
        });
        self
    }

    /// Marks `T` as a named configuration object, supplied only through
    /// configured arguments and never constructed by the resolver.
    pub fn config_object(mut self) -> Self {
        self.config_object = true;
        self
    }

    pub(crate) fn into_descriptor(self) -> ComponentDescriptor {
        ComponentDescriptor {
            key: TypeKey::of::<T>(),
            constructors: self.constructors,
            capabilities: self.capabilities,
            provider: self.provider,
            config_object: self.config_object,
        }
    }
}

/// The erased registration for one implementation type.
pub struct ComponentDescriptor {
    key: TypeKey,
    constructors: Vec<Arc<ConstructorDescriptor>>,
    capabilities: HashMap<TypeKey, Upcast>,
    provider: Option<ProviderDescriptor>,
    config_object: bool,
}

impl ComponentDescriptor {
    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    pub fn constructors(&self) -> &[Arc<ConstructorDescriptor>] {
        &self.constructors
    }

    /// True if a value of this type can be used where `ty` is required.
    pub fn implements(&self, ty: TypeKey) -> bool {
        self.key == ty || self.capabilities.contains_key(&ty)
    }

    /// Declared capabilities, sorted by name.
    pub fn capabilities(&self) -> Vec<TypeKey> {
        let mut caps: Vec<TypeKey> = self.capabilities.keys().copied().collect();
        caps.sort();
        caps
    }

    pub(crate) fn upcast(&self, ty: TypeKey) -> Option<&Upcast> {
        self.capabilities.get(&ty)
    }

    pub fn provider(&self) -> Option<&ProviderDescriptor> {
        self.provider.as_ref()
    }

    pub fn is_config_object(&self) -> bool {
        self.config_object
    }

    /// Picks the constructor to inject.
    ///
    /// A single public constructor marked injectable wins; otherwise the sole
    /// public constructor is used. Anything else is ambiguous.
    pub fn select_constructor(&self) -> ConstructorSelection {
        let public: SmallVec<[&Arc<ConstructorDescriptor>; 4]> = self
            .constructors
            .iter()
            .filter(|c| c.visibility == Visibility::Public)
            .collect();
        let marked: SmallVec<[&Arc<ConstructorDescriptor>; 4]> =
            public.iter().copied().filter(|c| c.injectable).collect();

        match (marked.len(), public.len()) {
            (1, _) => ConstructorSelection::Selected(Arc::clone(marked[0])),
            (0, 0) => ConstructorSelection::NoneAccessible,
            (0, 1) => ConstructorSelection::Selected(Arc::clone(public[0])),
            (0, n) => ConstructorSelection::Ambiguous(n),
            (n, _) => ConstructorSelection::Ambiguous(n),
        }
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("key", &self.key)
            .field("constructors", &self.constructors)
            .field("capabilities", &self.capabilities())
            .field("provides", &self.provider.as_ref().map(|p| p.product))
            .field("config_object", &self.config_object)
            .finish()
    }
}
