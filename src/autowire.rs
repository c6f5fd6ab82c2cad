//! The autowire engine.
//!
//! [`Autowire`] turns type names into instances and callables into results,
//! supplying missing arguments through the parameter-matching algorithm.
//! It is a short-lived view over the container, created on demand by the
//! resolver and by [`Container::call`](crate::Container::call).
//!
//! Callables are a closed set of shapes ([`CallableRef`]): a bare closure
//! with a declared parameter schema, a `"Type::method"` string, a
//! type-plus-method or instance-plus-method pair, and invokable values or
//! types (a blueprint with a designated invoke method). Every shape is
//! reduced to a target-parameter list plus an invoke thunk before the
//! parameter resolver runs.

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::container::Container;
use crate::error::{Error, ErrorKind};
use crate::inspect::Blueprint;
use crate::params::{Args, ParameterResolver, ResolvedArgs, TargetParam};
use crate::value::{Shared, Value};

/// Invoke thunk of a bare callable.
pub type CallFn = Shared<dyn Fn(&Container, ResolvedArgs) -> Result<Value, Error>>;

/// One callable shape accepted by [`Container::call`](crate::Container::call).
#[derive(Clone)]
pub enum CallableRef {
    /// A bare function or closure with its declared parameter schema.
    Function {
        params: Vec<TargetParam>,
        func: CallFn,
    },
    /// A method on an instance the container resolves by type name.
    TypeMethod(String, String),
    /// A method on an already-built value.
    InstanceMethod(Value, String),
    /// An invokable value (its blueprint designates the invoke method).
    Invokable(Value),
    /// An invokable type, resolved by name first.
    InvokableType(String),
}

impl CallableRef {
    /// A function with declared target parameters.
    pub fn function<F>(params: Vec<TargetParam>, f: F) -> Self
    where
        F: Fn(&Container, &mut ResolvedArgs) -> Result<Value, Error> + 'static,
    {
        let func: CallFn =
            Shared::new(move |container: &Container, mut args: ResolvedArgs| f(container, &mut args));
        CallableRef::Function { params, func }
    }

    /// A parameterless closure.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Container) -> Result<Value, Error> + 'static,
    {
        Self::function(vec![], move |container, _| f(container))
    }
}

/// `"Type::method"` becomes a type-method reference; a plain type name an
/// invokable-type reference.
impl From<&str> for CallableRef {
    fn from(reference: &str) -> Self {
        match reference.split_once("::") {
            Some((type_name, method)) => {
                CallableRef::TypeMethod(type_name.to_string(), method.to_string())
            }
            None => CallableRef::InvokableType(reference.to_string()),
        }
    }
}

impl From<(&str, &str)> for CallableRef {
    fn from((type_name, method): (&str, &str)) -> Self {
        CallableRef::TypeMethod(type_name.to_string(), method.to_string())
    }
}

impl From<(Value, &str)> for CallableRef {
    fn from((receiver, method): (Value, &str)) -> Self {
        CallableRef::InstanceMethod(receiver, method.to_string())
    }
}

impl From<Value> for CallableRef {
    fn from(receiver: Value) -> Self {
        CallableRef::Invokable(receiver)
    }
}

/// The autowire engine: a borrowed view over one container.
pub struct Autowire<'a> {
    container: &'a Container,
}

impl<'a> Autowire<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Instantiates `type_name`, autowiring constructor parameters not
    /// covered by `parameters`.
    pub fn resolve(&self, type_name: &str, parameters: Args) -> Result<Value, Error> {
        #[cfg(feature = "tracing")]
        trace!("Autowiring type: {}", type_name);

        let blueprint = self
            .container
            .inspector()
            .blueprint(type_name)
            .ok_or_else(|| Error::autowire(format!("Type ({}) does not exist", type_name)))?;

        let constructor = blueprint
            .constructor()
            .ok_or_else(|| Error::autowire(format!("Type ({}) is not instantiable", type_name)))?;

        let args = ParameterResolver::new(self.container).resolve(
            type_name,
            constructor.params(),
            parameters,
        )?;

        constructor.construct(self.container, ResolvedArgs::new(args))
    }

    /// Invokes a callable, autowiring parameters not covered by
    /// `parameters`, and returns its result.
    pub fn call(
        &self,
        callable: impl Into<CallableRef>,
        parameters: Args,
    ) -> Result<Value, Error> {
        match callable.into() {
            CallableRef::Function { params, func } => {
                let args =
                    ParameterResolver::new(self.container).resolve("closure", &params, parameters)?;
                func(self.container, ResolvedArgs::new(args))
            }
            CallableRef::TypeMethod(type_name, method) => {
                let receiver = self.receiver(&type_name)?;
                self.call_method(&receiver, &method, parameters)
            }
            CallableRef::InstanceMethod(receiver, method) => {
                self.call_method(&receiver, &method, parameters)
            }
            CallableRef::Invokable(receiver) => self.call_invokable(receiver, parameters),
            CallableRef::InvokableType(type_name) => {
                let receiver = self.receiver(&type_name)?;
                self.call_invokable(receiver, parameters)
            }
        }
    }

    /// Resolves the receiver instance of a type-level callable through the
    /// container, so definitions and the cache apply.
    fn receiver(&self, type_name: &str) -> Result<Value, Error> {
        self.container.get(type_name).map_err(|error| match error.kind {
            ErrorKind::NotFound => Error::autowire(error.message),
            _ => error,
        })
    }

    fn call_invokable(&self, receiver: Value, parameters: Args) -> Result<Value, Error> {
        let blueprint = self.blueprint_of(&receiver)?;
        let method = blueprint
            .invoke_method()
            .ok_or_else(|| {
                Error::autowire(format!("Type ({}) is not callable", blueprint.name()))
            })?
            .to_string();
        self.call_method(&receiver, &method, parameters)
    }

    fn call_method(
        &self,
        receiver: &Value,
        method: &str,
        parameters: Args,
    ) -> Result<Value, Error> {
        let blueprint = self.blueprint_of(receiver)?;

        let target = blueprint.method(method).ok_or_else(|| {
            Error::autowire(format!(
                "Method ({}::{}) is not callable",
                blueprint.name(),
                method
            ))
        })?;

        let subject = format!("{}::{}", blueprint.name(), method);
        let args =
            ParameterResolver::new(self.container).resolve(&subject, target.params(), parameters)?;

        target.call(self.container, receiver, ResolvedArgs::new(args))
    }

    fn blueprint_of(&self, receiver: &Value) -> Result<Shared<Blueprint>, Error> {
        let type_id = receiver
            .any_type_id()
            .ok_or_else(|| Error::autowire("Value is not callable"))?;

        self.container
            .inspector()
            .blueprint_of(type_id)
            .ok_or_else(|| Error::autowire("Value is not callable: type has no blueprint"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::inspect::{Blueprint, TypeRegistry};

    struct Stamp {
        code: u32,
    }

    fn container() -> Shared<Container> {
        let registry = Shared::new(TypeRegistry::new());
        registry.add(
            Blueprint::of::<Stamp>("Stamp")
                .constructor(vec![], |_, _| Ok(Stamp { code: 7 }))
                .method("code", vec![], |_, stamp, _| Ok(Value::new(stamp.code)))
                .invokable("code"),
        );
        Container::with_inspector(registry)
    }

    #[test]
    fn resolves_a_registered_type() {
        let c = container();
        let stamp = Autowire::new(&c).resolve("Stamp", Args::new()).unwrap();
        assert_eq!(stamp.downcast::<Stamp>().unwrap().code, 7);
    }

    #[test]
    fn unknown_type_is_an_autowire_error() {
        let c = container();
        let err = Autowire::new(&c).resolve("Seal", Args::new()).unwrap_err();
        assert!(err.kind == ErrorKind::Autowire);
    }

    #[test]
    fn type_method_string_reference() {
        let c = container();
        let result = Autowire::new(&c).call("Stamp::code", Args::new()).unwrap();
        assert_eq!(*result.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn plain_type_string_invokes_the_designated_method() {
        let c = container();
        let result = Autowire::new(&c).call("Stamp", Args::new()).unwrap();
        assert_eq!(*result.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn unknown_method_is_an_autowire_error() {
        let c = container();
        let err = Autowire::new(&c)
            .call(("Stamp", "emboss"), Args::new())
            .unwrap_err();
        assert!(err.kind == ErrorKind::Autowire);
        assert!(err.message.contains("Stamp::emboss"));
    }

    #[test]
    fn closure_with_supplied_parameter() {
        let c = container();
        let callable = CallableRef::function(vec![TargetParam::new("label")], |_, args| {
            Ok(Value::from(format!("stamped: {}", args.take_str()?)))
        });
        let result = Autowire::new(&c)
            .call(callable, Args::new().value("paid"))
            .unwrap();
        assert_eq!(result.as_str(), Some("stamped: paid"));
    }
}
