//! Dynamic entry values.
//!
//! A container entry can hold nothing, a string (which doubles as a type
//! reference when a blueprint is registered under that name), an arbitrary
//! shared object or scalar, or a factory closure that builds the value on
//! demand with the container.

use std::any::{Any, TypeId};

use crate::container::Container;
use crate::error::Error;

// Shared<T> is the container-wide shared pointer. Resolution is
// single-threaded per container, so plain reference counting is enough.
pub use std::rc::Rc as Shared;

/// Factory closure invoked with the container when the entry is resolved.
pub type FactoryFn = Shared<dyn Fn(&Container) -> Result<Value, Error>>;

/// A dynamic container value.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value; a definition holding `Null` resolves its own id.
    Null,
    /// A string, or a type reference when the registry knows the name.
    Str(String),
    /// A pre-built shared object or scalar.
    Any(Shared<dyn Any>),
    /// Deferred construction; invoked with the container.
    Factory(FactoryFn),
}

impl Value {
    /// Wraps any value as a shared object.
    pub fn new<T: 'static>(value: T) -> Self {
        Value::Any(Shared::new(value))
    }

    /// Wraps a factory closure invoked with the container on resolution.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Container) -> Result<Value, Error> + 'static,
    {
        Value::Factory(Shared::new(factory))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string content, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            Value::Any(v) => v.downcast_ref::<String>().map(|s| s.as_str()),
            _ => None,
        }
    }

    /// The concrete type id of a shared object value.
    pub(crate) fn any_type_id(&self) -> Option<TypeId> {
        match self {
            Value::Any(v) => Some(v.as_ref().type_id()),
            _ => None,
        }
    }

    /// Downcasts a shared object value to a concrete type.
    pub fn downcast<T: 'static>(&self) -> Result<Shared<T>, Error> {
        match self {
            Value::Any(v) => v
                .clone()
                .downcast::<T>()
                .map_err(|_| Error::type_mismatch(std::any::type_name::<T>())),
            Value::Str(s) => {
                let shared: Shared<dyn Any> = Shared::new(s.clone());
                shared
                    .downcast::<T>()
                    .map_err(|_| Error::type_mismatch(std::any::type_name::<T>()))
            }
            _ => Err(Error::type_mismatch(std::any::type_name::<T>())),
        }
    }

    /// Allocation identity: true when both values share the same object.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Any(a), Value::Any(b)) => Shared::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::new(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::new(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::new(value)
    }
}

impl<T: Any> From<Shared<T>> for Value {
    fn from(value: Shared<T>) -> Self {
        Value::Any(value)
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::Any(_) => write!(f, "Value::Any(..)"),
            Value::Factory(_) => write!(f, "Value::Factory(..)"),
        }
    }
}
