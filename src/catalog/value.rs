//! Type-erased values flowing through resolution and build.

use super::key::TypeKey;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Error type returned by user-supplied constructors, providers and decorations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A shared value of a known type.
///
/// The payload is always an `Arc<T>` stored behind `Any`, so concrete values
/// and trait objects (`Arc<dyn Pricer>`) are carried and recovered the same way.
#[derive(Clone)]
pub struct Value {
    ty: TypeKey,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Value {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            ty: TypeKey::of::<T>(),
            inner: Arc::new(value),
        }
    }

    pub fn of<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Arc::new(value))
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.ty == TypeKey::of::<T>()
    }

    /// Recovers the shared payload, or `None` if the value is not a `T`.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.ty)
    }
}

/// A configured argument: a value plus the text used to show it in diagnostics.
#[derive(Clone)]
pub struct Argument {
    value: Value,
    display: String,
}

impl Argument {
    pub fn new<T: fmt::Debug + Send + Sync + 'static>(value: T) -> Self {
        let display = format!("{:?}", value);
        Self {
            value: Value::of(value),
            display,
        }
    }

    /// A textual argument, eligible for conversion to the parameter's type.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text.into())
    }

    pub fn from_value(value: Value, display: impl Into<String>) -> Self {
        Self {
            value,
            display: display.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn type_key(&self) -> TypeKey {
        self.value.type_key()
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// The raw text if this argument is textual.
    pub fn as_text(&self) -> Option<Arc<String>> {
        self.value.downcast::<String>()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Argument<{}>({})", self.value.type_key(), self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Quote: Send + Sync {
        fn mid(&self) -> f64;
    }

    struct Fixed(f64);

    impl Quote for Fixed {
        fn mid(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_concrete_and_trait_object_values() {
        let concrete = Value::of(42_i32);
        assert!(concrete.is::<i32>());
        assert_eq!(*concrete.downcast::<i32>().unwrap(), 42);
        assert!(concrete.downcast::<i64>().is_none());

        let quote: Arc<dyn Quote> = Arc::new(Fixed(1.25));
        let erased = Value::new(quote);
        assert!(erased.is::<dyn Quote>());
        assert_eq!(erased.downcast::<dyn Quote>().unwrap().mid(), 1.25);
        assert!(erased.downcast::<Fixed>().is_none());
    }

    #[test]
    fn test_argument_text_detection() {
        let text = Argument::text("1, 2, 3");
        assert_eq!(text.as_text().as_deref().map(String::as_str), Some("1, 2, 3"));
        assert_eq!(text.display(), "\"1, 2, 3\"");

        let number = Argument::new(123_i32);
        assert!(number.as_text().is_none());
        assert_eq!(number.display(), "123");
    }
}
