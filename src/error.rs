//! Error types for the kedi container.
//!
//! This module defines a lightweight error model used across the container to
//! describe failures that can occur during blueprint registration, entry
//! resolution, autowiring, and callable invocation.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category, a human-readable message, and optionally
//!   the error it wraps.
//!
//! `NotFound` and `CircularDependency` are never wrapped, so callers can
//! always distinguish "missing" from "broken". Everything else that escapes
//! a resolution is rewrapped as a `Container` error carrying the original
//! message, with the original error kept as the cause.
//!
//! # Feature Flags
//!
//! - `tracing`: logs errors when they are created.
//! - `debug`: enables extra diagnostic formatting in `Display`.
//!
//! # Examples
//!
//! ```
//! use kedi::Error;
//!
//! let err = Error::not_found("mailer");
//! assert!(err.message.contains("mailer"));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::{error, warn};

/// Error categories for the container.
///
/// These variants are intentionally coarse-grained to keep error handling
/// straightforward while still expressive enough for diagnostics.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum ErrorKind {
    /// No definition, no cache entry and no blueprint for the identifier.
    NotFound,
    /// Identifier is already being resolved on the current call stack.
    CircularDependency,
    /// Autowiring failure: unknown type, unreachable constructor or method,
    /// or a required parameter that cannot be satisfied.
    Autowire,
    /// Generic container failure wrapping another error.
    Container,
    /// Type mismatch during downcast.
    TypeMismatch,
    /// Blueprint already registered for this name.
    AlreadyRegistered,
}

/// Container error structure.
///
/// `kind` enables programmatic handling, while `message` is human-readable.
/// `cause` carries the wrapped error when one exists.
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub cause: Option<Box<Error>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// If the `tracing` feature is enabled, the error is automatically
    /// logged: expected lookup misses as warnings, everything else as
    /// errors.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind: kind.clone(),
            message: message.into(),
            cause: None,
        };

        #[cfg(feature = "tracing")]
        if matches!(kind, ErrorKind::NotFound | ErrorKind::AlreadyRegistered) {
            warn!("{}", error);
        } else {
            error!("{}", error);
        }

        error
    }

    /// No entry was found for the identifier.
    pub fn not_found(id: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("No entry was found for the id ({})", id),
        )
    }

    /// Identifier is already being resolved on the current call stack.
    pub fn circular_dependency(id: &str) -> Self {
        Self::new(
            ErrorKind::CircularDependency,
            format!(
                "Entry ({}) cannot be resolved: circular dependency detected",
                id
            ),
        )
    }

    /// Autowiring failure.
    pub fn autowire(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Autowire, message)
    }

    /// Wraps another error as a generic container error.
    ///
    /// The original message is preserved and the wrapped error is kept as
    /// the cause.
    pub fn container(cause: Error) -> Self {
        let mut error = Self::new(ErrorKind::Container, cause.message.clone());
        error.cause = Some(Box::new(cause));
        error
    }

    /// Type mismatch during downcast.
    pub fn type_mismatch(type_name: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Type mismatch when resolving: {}", type_name),
        )
    }

    /// Blueprint already registered for this name.
    pub fn already_registered(name: &str) -> Self {
        Self::new(
            ErrorKind::AlreadyRegistered,
            format!("Blueprint already registered for: {}", name),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "debug")]
        {
            write!(f, "({:?}) - {}", self.kind, self.message)
        }
        #[cfg(not(feature = "debug"))]
        {
            write!(f, "{}", self.message)
        }
    }
}

#[cfg(feature = "debug")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
