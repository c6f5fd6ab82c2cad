//! Definition post-processing.
//!
//! [`Resolver`] turns a stored [`Definition`] into a final value. The value
//! goes through up to two string-redirection hops (a `Null` definition falls
//! back to its own id; a string pointing at a known type is resolved through
//! the autowire engine), factory closures are invoked with the container,
//! and declared method calls run against the built object in order.

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::autowire::{Autowire, CallableRef};
use crate::container::Container;
use crate::definition::Definition;
use crate::error::Error;
use crate::params::Args;
use crate::value::Value;

#[derive(Default)]
pub struct Resolver;

impl Resolver {
    pub(crate) fn new() -> Self {
        Self
    }

    /// Instantiates a type by name through the autowire engine.
    pub fn resolve(
        &self,
        container: &Container,
        id: &str,
        parameters: Args,
    ) -> Result<Value, Error> {
        Autowire::new(container).resolve(id, parameters)
    }

    /// Whether the id names a type the autowire engine could instantiate
    /// or call into.
    pub fn is_resolvable(&self, container: &Container, id: &str) -> bool {
        container.inspector().exists(id)
    }

    /// Produces the final value of a definition.
    ///
    /// A `Null` value falls back to the definition id, so `set_type("Foo")`
    /// means "autowire the type named Foo". A string value with explicit
    /// parameters is resolved as a type with those parameters; a remaining
    /// string naming a known type is resolved without parameters, which
    /// covers alias chains and interface bindings. Strings naming nothing
    /// stay plain strings.
    pub fn resolve_definition(
        &self,
        container: &Container,
        definition: &Definition,
    ) -> Result<Value, Error> {
        #[cfg(feature = "tracing")]
        trace!("Resolving definition: {}", definition.id());

        let mut value = if definition.value().is_null() {
            Value::Str(definition.id().to_string())
        } else {
            definition.value().clone()
        };

        if !definition.parameters().is_empty() {
            let type_name = value.as_str().map(str::to_string);
            if let Some(type_name) = type_name {
                value = self.resolve(container, &type_name, definition.parameters().clone())?;
            }
        }

        let type_name = value.as_str().map(str::to_string);
        if let Some(type_name) = type_name {
            if self.is_resolvable(container, &type_name) {
                value = self.resolve(container, &type_name, Args::new())?;
            }
        }

        if let Value::Factory(factory) = value.clone() {
            value = factory(container)?;
        }

        if !definition.methods().is_empty() && matches!(value, Value::Any(_)) {
            self.call_methods(container, &value, definition)?;
        }

        Ok(value)
    }

    /// Runs the declared method calls in order. A method the built object
    /// does not have is skipped silently; the remaining calls still run.
    fn call_methods(
        &self,
        container: &Container,
        value: &Value,
        definition: &Definition,
    ) -> Result<(), Error> {
        for (name, parameters) in definition.methods() {
            let known = value
                .any_type_id()
                .and_then(|type_id| container.inspector().blueprint_of(type_id))
                .is_some_and(|blueprint| blueprint.has_method(name));

            if !known {
                #[cfg(feature = "tracing")]
                trace!(
                    "Skipping unknown method ({}) on definition: {}",
                    name,
                    definition.id()
                );
                continue;
            }

            Autowire::new(container).call(
                CallableRef::InstanceMethod(value.clone(), name.clone()),
                parameters.clone(),
            )?;
        }
        Ok(())
    }
}
