//! Target parameters, supplied parameters, and the matching algorithm.
//!
//! A [`TargetParam`] describes one formal parameter of a constructor or
//! method: its name, its declared type candidates in declaration order
//! (more than one for union types), whether it accepts null, and whether it
//! is optional with a default. [`Args`] is the order-preserving list of
//! supplied parameters, keyed by position or by name.
//!
//! [`ParameterResolver`] produces the final ordered argument list: supplied
//! position first, then supplied name, then the first type candidate the
//! container can provide, then the nullable/default fallbacks. Unconsumed
//! supplied parameters are ignored.

use crate::container::Container;
use crate::error::{Error, ErrorKind};
use crate::value::Value;

/// A formal parameter description consumed by the autowire engine.
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct TargetParam {
    name: String,
    type_candidates: Vec<String>,
    nullable: bool,
    optional: bool,
    default: Option<Value>,
}

impl TargetParam {
    /// A required parameter with no usable type (built-in/scalar).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_candidates: Vec::new(),
            nullable: false,
            optional: false,
            default: None,
        }
    }

    /// A typed parameter; candidates are tried in declaration order.
    pub fn typed<I, S>(name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_candidates: candidates.into_iter().map(Into::into).collect(),
            ..Self::new(name)
        }
    }

    /// Marks the parameter as accepting null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the parameter as optional with the given default value.
    pub fn optional(mut self, default: impl Into<Value>) -> Self {
        self.optional = true;
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[String] {
        &self.type_candidates
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Key of one supplied parameter.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum ArgKey {
    Position(usize),
    Name(String),
}

/// Supplied parameters, order-preserving, keyed by position and/or name.
#[derive(Clone, Default)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Args {
    items: Vec<(ArgKey, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional parameter.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.push(value.into());
        self
    }

    /// Appends a named parameter.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_named(name, value.into());
        self
    }

    /// Appends a positional parameter at the next free position.
    pub fn push(&mut self, value: Value) {
        let position = self
            .items
            .iter()
            .filter(|(key, _)| matches!(key, ArgKey::Position(_)))
            .count();
        self.items.push((ArgKey::Position(position), value));
    }

    /// Appends a named parameter.
    pub fn push_named(&mut self, name: impl Into<String>, value: Value) {
        self.items.push((ArgKey::Name(name.into()), value));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn take_position(&mut self, position: usize) -> Option<Value> {
        let at = self
            .items
            .iter()
            .position(|(key, _)| *key == ArgKey::Position(position))?;
        Some(self.items.remove(at).1)
    }

    pub(crate) fn take_named(&mut self, name: &str) -> Option<Value> {
        let at = self
            .items
            .iter()
            .position(|(key, _)| matches!(key, ArgKey::Name(n) if n == name))?;
        Some(self.items.remove(at).1)
    }
}

/// Final ordered argument list handed to a build or invoke thunk.
///
/// Thunks pull arguments in declaration order with the `take_*` helpers.
pub struct ResolvedArgs {
    values: std::vec::IntoIter<Value>,
}

impl ResolvedArgs {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// The next argument, or `Value::Null` past the end.
    pub fn take(&mut self) -> Value {
        self.values.next().unwrap_or(Value::Null)
    }

    /// The next argument downcast to a concrete shared type.
    pub fn take_as<T: 'static>(&mut self) -> Result<crate::value::Shared<T>, Error> {
        self.take().downcast::<T>()
    }

    /// The next argument as an optional shared type; `Null` becomes `None`.
    pub fn take_opt<T: 'static>(&mut self) -> Result<Option<crate::value::Shared<T>>, Error> {
        let value = self.take();
        if value.is_null() {
            Ok(None)
        } else {
            value.downcast::<T>().map(Some)
        }
    }

    /// The next argument as an owned string.
    pub fn take_str(&mut self) -> Result<String, Error> {
        let value = self.take();
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::type_mismatch("String"))
    }
}

/// The parameter-matching algorithm.
///
/// For each target parameter at position `i` with name `n`:
///
/// 1. a supplied parameter at position `i` is used and consumed;
/// 2. else a supplied parameter named `n` is used and consumed;
/// 3. else for a typed parameter, candidates are tried in declaration order
///    against `Container::get`; the first that does not fail with `NotFound`
///    wins. If none resolve: null when nullable, else the default when one
///    exists, else the resolution fails;
/// 4. else (no usable type): the default when optional, null when nullable,
///    else the resolution fails.
pub struct ParameterResolver<'a> {
    container: &'a Container,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Produces the final ordered argument list for `targets`.
    ///
    /// `subject` names the constructor or method, for error messages only.
    pub fn resolve(
        &self,
        subject: &str,
        targets: &[TargetParam],
        mut supplied: Args,
    ) -> Result<Vec<Value>, Error> {
        let mut resolved = Vec::with_capacity(targets.len());

        for (position, target) in targets.iter().enumerate() {
            if let Some(value) = supplied.take_position(position) {
                resolved.push(value);
                continue;
            }

            if let Some(value) = supplied.take_named(target.name()) {
                resolved.push(value);
                continue;
            }

            if !target.candidates().is_empty() {
                if let Some(value) = self.resolve_candidates(target)? {
                    resolved.push(value);
                    continue;
                }

                if target.is_nullable() {
                    resolved.push(Value::Null);
                    continue;
                }

                if let Some(default) = target.default_value() {
                    resolved.push(default.clone());
                    continue;
                }

                return Err(Self::unresolvable(subject, target));
            }

            if target.is_optional() || target.default_value().is_some() {
                resolved.push(target.default_value().cloned().unwrap_or(Value::Null));
                continue;
            }

            if target.is_nullable() {
                resolved.push(Value::Null);
                continue;
            }

            return Err(Self::unresolvable(subject, target));
        }

        // Unconsumed supplied parameters beyond the target list are ignored.
        Ok(resolved)
    }

    /// Tries each type candidate in declaration order; only `NotFound`
    /// moves on to the next candidate.
    fn resolve_candidates(&self, target: &TargetParam) -> Result<Option<Value>, Error> {
        for candidate in target.candidates() {
            match self.container.get(candidate) {
                Ok(value) => return Ok(Some(value)),
                Err(error) if error.kind == ErrorKind::NotFound => continue,
                Err(error) => return Err(error),
            }
        }
        Ok(None)
    }

    fn unresolvable(subject: &str, target: &TargetParam) -> Error {
        Error::autowire(format!(
            "Parameter ({}) of ({}) is not resolvable",
            target.name(),
            subject
        ))
    }
}
