//! The parameter-inspection boundary.
//!
//! Rust has no runtime reflection, so the facility that, given a type or
//! callable, yields its ordered target-parameter list is realized as
//! explicit schema registration: a [`Blueprint`] per type, carrying the
//! constructor schema with its build thunk, named method schemas with their
//! invoke thunks, and optionally a designated invoke method that makes
//! instances callable.
//!
//! The resolution engine consults only the [`Inspect`] trait; the default
//! implementation is [`TypeRegistry`]. Any other schema source (generated
//! code, a derive macro, a foreign registry) can be plugged in through
//! [`Container::with_inspector`](crate::Container::with_inspector).
//!
//! # Examples
//!
//! ```
//! use kedi::{Blueprint, TargetParam, TypeRegistry};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let registry = TypeRegistry::new();
//! registry.add(
//!     Blueprint::of::<Greeter>("Greeter")
//!         .constructor(vec![], |_, _| {
//!             Ok(Greeter { greeting: "hello".to_string() })
//!         })
//!         .method("greet", vec![TargetParam::new("name")], |_, greeter, args| {
//!             Ok(format!("{} {}", greeter.greeting, args.take_str()?).into())
//!         }),
//! );
//! ```

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;

#[cfg(feature = "tracing")]
use tracing::info;

use crate::container::Container;
use crate::error::Error;
use crate::params::{ResolvedArgs, TargetParam};
use crate::value::{Shared, Value};

/// Build thunk of a constructor.
pub type BuildFn = Shared<dyn Fn(&Container, ResolvedArgs) -> Result<Value, Error>>;

/// Invoke thunk of a method; the receiver is passed as a [`Value`].
pub type MethodFn = Shared<dyn Fn(&Container, &Value, ResolvedArgs) -> Result<Value, Error>>;

/// Constructor schema: ordered target parameters plus the build thunk.
pub struct Constructor {
    params: Vec<TargetParam>,
    build: BuildFn,
}

impl Constructor {
    pub fn params(&self) -> &[TargetParam] {
        &self.params
    }

    pub(crate) fn construct(
        &self,
        container: &Container,
        args: ResolvedArgs,
    ) -> Result<Value, Error> {
        (self.build)(container, args)
    }
}

/// Method schema: name, ordered target parameters, invoke thunk.
pub struct Method {
    name: String,
    params: Vec<TargetParam>,
    invoke: MethodFn,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TargetParam] {
        &self.params
    }

    pub(crate) fn call(
        &self,
        container: &Container,
        receiver: &Value,
        args: ResolvedArgs,
    ) -> Result<Value, Error> {
        (self.invoke)(container, receiver, args)
    }
}

/// Everything the container knows about one type.
///
/// A blueprint without a constructor describes a type the container can
/// call methods on but cannot instantiate.
pub struct Blueprint {
    name: String,
    type_id: TypeId,
    constructor: Option<Constructor>,
    methods: Vec<Method>,
    invoke_method: Option<String>,
}

impl Blueprint {
    /// Starts a blueprint for `T` registered under `name`.
    pub fn of<T: 'static>(name: impl Into<String>) -> BlueprintBuilder<T> {
        BlueprintBuilder {
            name: name.into(),
            constructor: None,
            methods: Vec::new(),
            invoke_method: None,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub(crate) fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }

    pub(crate) fn invoke_method(&self) -> Option<&str> {
        self.invoke_method.as_deref()
    }
}

/// Fluent construction of a [`Blueprint`] for a concrete type `T`.
///
/// The thunks registered here are the only place the dynamic [`Value`]
/// world meets the concrete type: the builder wraps them so that build
/// results are shared automatically and method receivers are downcast
/// before the user closure runs.
pub struct BlueprintBuilder<T: 'static> {
    name: String,
    constructor: Option<Constructor>,
    methods: Vec<Method>,
    invoke_method: Option<String>,
    _marker: PhantomData<T>,
}

impl<T: 'static> BlueprintBuilder<T> {
    /// Declares the constructor: target parameters and a build closure
    /// pulling them from [`ResolvedArgs`] in declaration order.
    pub fn constructor<F>(mut self, params: Vec<TargetParam>, build: F) -> Self
    where
        F: Fn(&Container, &mut ResolvedArgs) -> Result<T, Error> + 'static,
    {
        let build: BuildFn = Shared::new(move |container: &Container, mut args: ResolvedArgs| {
            Ok(Value::new(build(container, &mut args)?))
        });
        self.constructor = Some(Constructor { params, build });
        self
    }

    /// Declares a publicly callable method.
    pub fn method<F>(mut self, name: impl Into<String>, params: Vec<TargetParam>, f: F) -> Self
    where
        F: Fn(&Container, &T, &mut ResolvedArgs) -> Result<Value, Error> + 'static,
    {
        let invoke: MethodFn = Shared::new(
            move |container: &Container, receiver: &Value, mut args: ResolvedArgs| {
                let receiver = receiver.downcast::<T>()?;
                f(container, &*receiver, &mut args)
            },
        );
        self.methods.push(Method {
            name: name.into(),
            params,
            invoke,
        });
        self
    }

    /// Designates an already declared method as the invoke method,
    /// making instances of `T` callable.
    pub fn invokable(mut self, method: impl Into<String>) -> Self {
        self.invoke_method = Some(method.into());
        self
    }
}

impl<T: 'static> From<BlueprintBuilder<T>> for Blueprint {
    fn from(builder: BlueprintBuilder<T>) -> Self {
        Blueprint {
            name: builder.name,
            type_id: TypeId::of::<T>(),
            constructor: builder.constructor,
            methods: builder.methods,
            invoke_method: builder.invoke_method,
        }
    }
}

/// The parameter-inspection interface the resolution engine consults.
pub trait Inspect {
    /// Blueprint registered under a type name.
    fn blueprint(&self, name: &str) -> Option<Shared<Blueprint>>;

    /// Blueprint of a concrete type, for method calls on bare values.
    fn blueprint_of(&self, type_id: TypeId) -> Option<Shared<Blueprint>>;

    /// Whether a type with this name exists.
    fn exists(&self, name: &str) -> bool {
        self.blueprint(name).is_some()
    }
}

/// Default [`Inspect`] implementation: a blueprint registry indexed by
/// name and by concrete type id.
#[derive(Default)]
pub struct TypeRegistry {
    by_name: RefCell<HashMap<String, Shared<Blueprint>>>,
    by_type: RefCell<HashMap<TypeId, Shared<Blueprint>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blueprint.
    ///
    /// # Panics
    ///
    /// Panics if a blueprint is already registered under the same name.
    /// Use [`try_add`](Self::try_add) for graceful handling.
    pub fn add(&self, blueprint: impl Into<Blueprint>) {
        self.try_add(blueprint).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Registers a blueprint, failing if the name is taken.
    pub fn try_add(&self, blueprint: impl Into<Blueprint>) -> Result<(), Error> {
        let blueprint = Shared::new(blueprint.into());

        if self.by_name.borrow().contains_key(blueprint.name()) {
            return Err(Error::already_registered(blueprint.name()));
        }

        #[cfg(feature = "tracing")]
        info!("Registered blueprint for type: {}", blueprint.name());

        self.by_name
            .borrow_mut()
            .insert(blueprint.name().to_string(), blueprint.clone());
        // When the same concrete type is registered under several names,
        // the last registration wins for by-value method lookup.
        self.by_type
            .borrow_mut()
            .insert(blueprint.type_id(), blueprint);

        Ok(())
    }
}

impl Inspect for TypeRegistry {
    fn blueprint(&self, name: &str) -> Option<Shared<Blueprint>> {
        self.by_name.borrow().get(name).cloned()
    }

    fn blueprint_of(&self, type_id: TypeId) -> Option<Shared<Blueprint>> {
        self.by_type.borrow().get(&type_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Clock {
        hour: u8,
    }

    fn clock_blueprint() -> BlueprintBuilder<Clock> {
        Blueprint::of::<Clock>("Clock")
            .constructor(vec![], |_, _| Ok(Clock { hour: 12 }))
            .method("hour", vec![], |_, clock, _| Ok(Value::new(clock.hour)))
    }

    #[test]
    fn registers_and_finds_by_name_and_type() {
        let registry = TypeRegistry::new();
        registry.add(clock_blueprint());

        assert!(registry.exists("Clock"));
        assert!(!registry.exists("Watch"));

        let by_name = registry.blueprint("Clock").unwrap();
        assert_eq!(by_name.name(), "Clock");

        let by_type = registry.blueprint_of(TypeId::of::<Clock>()).unwrap();
        assert_eq!(by_type.name(), "Clock");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry = TypeRegistry::new();
        registry.add(clock_blueprint());

        let err = registry.try_add(clock_blueprint()).unwrap_err();
        assert!(err.kind == ErrorKind::AlreadyRegistered);
    }

    #[test]
    fn method_lookup() {
        let registry = TypeRegistry::new();
        registry.add(clock_blueprint());

        let blueprint = registry.blueprint("Clock").unwrap();
        assert!(blueprint.has_method("hour"));
        assert!(!blueprint.has_method("minute"));
        assert!(blueprint.invoke_method().is_none());
    }

    #[test]
    fn invokable_designates_a_method() {
        let registry = TypeRegistry::new();
        registry.add(clock_blueprint().invokable("hour"));

        let blueprint = registry.blueprint("Clock").unwrap();
        assert_eq!(blueprint.invoke_method(), Some("hour"));
    }
}
