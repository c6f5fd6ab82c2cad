//! The service container.
//!
//! [`Container`] maps string identifiers to values. An entry comes from a
//! stored definition, from autowiring a registered type blueprint, or from
//! the singleton cache. Resolution detects circular dependencies and
//! distinguishes "no such entry" from "entry exists but cannot be built".
//!
//! Entries are singletons by default: the first `get` resolves and caches,
//! later `get` calls return the same shared value. Definitions marked
//! prototype resolve fresh on every lookup. `make` builds a fresh instance
//! from a type blueprint alone, bypassing definitions and the cache.
//!
//! # Examples
//!
//! ```
//! use kedi::{Blueprint, Container, Shared, TargetParam, TypeRegistry};
//!
//! struct Transport;
//! struct Mailer {
//!     transport: Shared<Transport>,
//! }
//!
//! let registry = Shared::new(TypeRegistry::new());
//! registry.add(Blueprint::of::<Transport>("Transport").constructor(vec![], |_, _| Ok(Transport)));
//! registry.add(
//!     Blueprint::of::<Mailer>("Mailer").constructor(
//!         vec![TargetParam::typed("transport", ["Transport"])],
//!         |_, args| Ok(Mailer { transport: args.take_as()? }),
//!     ),
//! );
//!
//! let container = Container::with_inspector(registry);
//! let mailer = container.get_as::<Mailer>("Mailer")?;
//! let transport = container.get_as::<Transport>("Transport")?;
//! assert!(Shared::ptr_eq(&mailer.transport, &transport));
//! # Ok::<(), kedi::Error>(())
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Weak;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::autowire::{Autowire, CallableRef};
use crate::definition::{Definition, DefinitionHandle};
use crate::error::{Error, ErrorKind};
use crate::inspect::{Inspect, TypeRegistry};
use crate::params::Args;
use crate::resolver::Resolver;
use crate::value::{Shared, Value};

/// Maps string identifiers to values, with autowiring and a singleton cache.
pub struct Container {
    this: Weak<Container>,
    inspector: Shared<dyn Inspect>,
    resolver: Resolver,
    definitions: RefCell<HashMap<String, Shared<RefCell<Definition>>>>,
    resolved: RefCell<HashMap<String, Value>>,
    resolving: RefCell<HashSet<String>>,
}

impl Container {
    /// Id under which the container injects itself.
    pub const ID: &'static str = "Container";
    /// Alternative self id for factory-style consumers.
    pub const MAKE_ID: &'static str = "Make";
    /// Alternative self id for invoker-style consumers.
    pub const CALL_ID: &'static str = "Call";

    /// A container with an empty [`TypeRegistry`] as its inspector.
    pub fn new() -> Shared<Self> {
        Self::with_inspector(Shared::new(TypeRegistry::new()))
    }

    /// A container consulting the given parameter-inspection source.
    pub fn with_inspector(inspector: Shared<dyn Inspect>) -> Shared<Self> {
        Shared::new_cyclic(|this| Self {
            this: this.clone(),
            inspector,
            resolver: Resolver::new(),
            definitions: RefCell::new(HashMap::new()),
            resolved: RefCell::new(HashMap::new()),
            resolving: RefCell::new(HashSet::new()),
        })
    }

    /// The container's own shared handle.
    ///
    /// The container is only reachable through the `Shared` pointer created
    /// in [`new`](Self::new), so the upgrade cannot fail while a caller
    /// holds `&self`.
    pub fn handle(&self) -> Shared<Container> {
        self.this.upgrade().expect("container self-handle")
    }

    /// The parameter-inspection source this container consults.
    pub fn inspector(&self) -> &dyn Inspect {
        &*self.inspector
    }

    /// Whether the container can return an entry for this id: a self id,
    /// a cached value, a stored definition, or a registered type.
    pub fn has(&self, id: &str) -> bool {
        self.builtin(id).is_some()
            || self.resolved.borrow().contains_key(id)
            || self.definitions.borrow().contains_key(id)
            || self.resolver.is_resolvable(self, id)
    }

    /// Returns the entry for `id`, resolving and caching it on first use.
    ///
    /// Prototype definitions resolve fresh on every call and are never
    /// cached. Fails with [`ErrorKind::NotFound`] when nothing is known
    /// under the id, and with a container-level error when the entry
    /// exists but cannot be built.
    pub fn get(&self, id: &str) -> Result<Value, Error> {
        if let Some(value) = self.builtin(id) {
            return Ok(value);
        }

        if let Some(definition) = self.definition(id) {
            if definition.borrow().is_prototype() {
                #[cfg(feature = "tracing")]
                trace!("Resolving prototype entry: {}", id);
                return self.resolve(id, None);
            }
        }

        let cached = self.resolved.borrow().get(id).cloned();
        if let Some(value) = cached {
            #[cfg(feature = "tracing")]
            trace!("Returning cached entry: {}", id);
            return Ok(value);
        }

        let value = self.resolve(id, None)?;
        self.resolved.borrow_mut().insert(id.to_string(), value.clone());
        Ok(value)
    }

    /// [`get`](Self::get) plus a downcast to a concrete shared type.
    pub fn get_as<T: 'static>(&self, id: &str) -> Result<Shared<T>, Error> {
        self.get(id)?.downcast::<T>()
    }

    /// Builds a fresh instance of the type named `id` with the supplied
    /// parameters, ignoring definitions and never touching the cache.
    pub fn make(&self, id: &str, parameters: Args) -> Result<Value, Error> {
        self.resolve(id, Some(parameters))
    }

    /// Invokes a callable with autowired parameters and returns its result.
    ///
    /// Autowiring failures surface as container-level errors.
    pub fn call(
        &self,
        callable: impl Into<CallableRef>,
        parameters: Args,
    ) -> Result<Value, Error> {
        Autowire::new(self)
            .call(callable, parameters)
            .map_err(Self::wrap)
    }

    /// Stores a definition for `id`, replacing any previous one, and
    /// returns a handle for fluent configuration.
    ///
    /// The value can be a plain string, a type name, a factory closure
    /// (see [`Value::factory`]) or a pre-built object. Replacing a
    /// definition does not evict an already cached singleton.
    pub fn set(&self, id: impl Into<String>, value: impl Into<Value>) -> DefinitionHandle {
        let id = id.into();
        #[cfg(feature = "tracing")]
        debug!("Setting definition for id: {}", id);

        let definition = Shared::new(RefCell::new(Definition::new(id.clone(), value.into())));
        self.definitions.borrow_mut().insert(id, definition.clone());
        DefinitionHandle::new(definition)
    }

    /// Stores a definition whose id doubles as the type to autowire.
    pub fn set_type(&self, id: impl Into<String>) -> DefinitionHandle {
        self.set(id, Value::Null)
    }

    /// Stores an already assembled definition under its own id.
    pub fn set_definition(&self, definition: Definition) -> DefinitionHandle {
        let id = definition.id().to_string();
        #[cfg(feature = "tracing")]
        debug!("Setting definition for id: {}", id);

        let definition = Shared::new(RefCell::new(definition));
        self.definitions.borrow_mut().insert(id, definition.clone());
        DefinitionHandle::new(definition)
    }

    fn definition(&self, id: &str) -> Option<Shared<RefCell<Definition>>> {
        self.definitions.borrow().get(id).cloned()
    }

    /// The self ids resolve to the container's own handle. They bypass the
    /// cache so no entry ever owns a strong cycle back to the container.
    fn builtin(&self, id: &str) -> Option<Value> {
        if matches!(id, Self::ID | Self::MAKE_ID | Self::CALL_ID) {
            let handle: Shared<dyn Any> = self.handle();
            Some(Value::Any(handle))
        } else {
            None
        }
    }

    /// One resolution frame: marks the id as in progress, dispatches, and
    /// unmarks on every exit path so a failed resolution does not poison
    /// later attempts on the same id.
    fn resolve(&self, id: &str, parameters: Option<Args>) -> Result<Value, Error> {
        if self.resolving.borrow().contains(id) {
            return Err(Error::circular_dependency(id));
        }
        self.resolving.borrow_mut().insert(id.to_string());

        let result = match parameters {
            None => self.resolve_with_definition(id),
            Some(parameters) => self.resolve_by_type(id, parameters),
        };

        self.resolving.borrow_mut().remove(id);

        result.map_err(Self::wrap)
    }

    fn resolve_with_definition(&self, id: &str) -> Result<Value, Error> {
        match self.definition(id) {
            Some(definition) => {
                // Snapshot so definition mutation during resolution cannot
                // hold the borrow open.
                let definition = definition.borrow().clone();
                self.resolver.resolve_definition(self, &definition)
            }
            None => self.resolve_by_type(id, Args::new()),
        }
    }

    fn resolve_by_type(&self, id: &str, parameters: Args) -> Result<Value, Error> {
        if !self.resolver.is_resolvable(self, id) {
            return Err(Error::not_found(id));
        }
        self.resolver.resolve(self, id, parameters)
    }

    /// Not-found, circular-dependency and already wrapped errors pass
    /// through; anything else becomes a container-level error.
    fn wrap(error: Error) -> Error {
        match error.kind {
            ErrorKind::NotFound | ErrorKind::CircularDependency | ErrorKind::Container => error,
            _ => Error::container(error),
        }
    }
}
