//! Definitions: how an entry should be built.
//!
//! A [`Definition`] describes the recipe for one identifier: the raw value
//! (string, type reference, factory closure, or pre-built object), explicit
//! constructor parameters, post-construction method calls, and the
//! singleton/prototype flag.
//!
//! [`Container::set`](crate::Container::set) returns a [`DefinitionHandle`]
//! for fluent configuration. The handle shares the stored definition, so
//! mutations are visible to the container immediately; mutating after the
//! first resolution affects future resolutions only (cached singletons are
//! not re-resolved).

use std::cell::RefCell;

use crate::params::Args;
use crate::value::{Shared, Value};

/// Recipe for building one container entry.
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Definition {
    id: String,
    value: Value,
    parameters: Args,
    methods: Vec<(String, Args)>,
    prototype: bool,
}

impl Definition {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
            parameters: Args::new(),
            methods: Vec::new(),
            prototype: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn parameters(&self) -> &Args {
        &self.parameters
    }

    pub fn methods(&self) -> &[(String, Args)] {
        &self.methods
    }

    pub fn is_prototype(&self) -> bool {
        self.prototype
    }

    pub(crate) fn set_parameters(&mut self, parameters: Args) {
        self.parameters = parameters;
    }

    pub(crate) fn add_method(&mut self, name: String, parameters: Args) {
        self.methods.push((name, parameters));
    }

    pub(crate) fn set_prototype(&mut self) {
        self.prototype = true;
    }
}

/// Fluent handle to a stored definition.
///
/// Returned by [`Container::set`](crate::Container::set); all mutations go
/// straight to the definition the container owns.
pub struct DefinitionHandle {
    inner: Shared<RefCell<Definition>>,
}

impl DefinitionHandle {
    pub(crate) fn new(inner: Shared<RefCell<Definition>>) -> Self {
        Self { inner }
    }

    /// Sets explicit constructor parameters, positional and/or named.
    pub fn with_parameters(self, parameters: Args) -> Self {
        self.inner.borrow_mut().set_parameters(parameters);
        self
    }

    /// Sets explicit constructor parameters from positional values.
    pub fn with_construct_args<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut parameters = Args::new();
        for value in values {
            parameters.push(value.into());
        }
        self.inner.borrow_mut().set_parameters(parameters);
        self
    }

    /// Appends a post-construction method call.
    ///
    /// Calls run in declared order; a method the built object does not
    /// have is skipped silently.
    pub fn call_method(self, name: impl Into<String>, parameters: Args) -> Self {
        self.inner.borrow_mut().add_method(name.into(), parameters);
        self
    }

    /// Marks the entry as prototype: fresh construction on every lookup,
    /// bypassing the singleton cache.
    pub fn as_prototype(self) -> Self {
        self.inner.borrow_mut().set_prototype();
        self
    }
}
