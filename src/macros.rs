//! Macros for ergonomic parameter lists.
//!
//! - [`args!`] macro: Build an [`Args`](crate::Args) list from positional
//!   and `name => value` entries in one expression.
//!
//! # Example
//! ```
//! use kedi::args;
//!
//! let args = args!["localhost", "port" => 8080i64];
//! assert_eq!(args.len(), 2);
//! ```

/// Builds an [`Args`](crate::Args) list.
///
/// Entries are either positional expressions or `name => value` pairs, in
/// any order; values go through [`Value::from`](crate::Value::from).
///
/// # Example
/// ```
/// use kedi::{args, Args};
///
/// let empty: Args = args![];
/// assert!(empty.is_empty());
///
/// let mixed = args!["first", "retries" => 3i64, "second"];
/// assert_eq!(mixed.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($rest:tt)+) => {{
        let mut args = $crate::Args::new();
        $crate::__args_push!(args, $($rest)+);
        args
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __args_push {
    ($args:ident $(,)?) => {};
    ($args:ident, $name:literal => $value:expr $(, $($rest:tt)*)?) => {
        $args.push_named($name, $crate::Value::from($value));
        $crate::__args_push!($args $(, $($rest)*)?);
    };
    ($args:ident, $value:expr $(, $($rest:tt)*)?) => {
        $args.push($crate::Value::from($value));
        $crate::__args_push!($args $(, $($rest)*)?);
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn empty_args() {
        let args = args![];
        assert!(args.is_empty());
    }

    #[test]
    fn positional_entries_in_order() {
        let mut args = args!["a", "b"];
        assert_eq!(args.take_position(0).unwrap().as_str(), Some("a"));
        assert_eq!(args.take_position(1).unwrap().as_str(), Some("b"));
    }

    #[test]
    fn named_entries() {
        let mut args = args!["host" => "localhost", "port" => 8080i64];
        assert_eq!(args.take_named("host").unwrap().as_str(), Some("localhost"));
        assert_eq!(*args.take_named("port").unwrap().downcast::<i64>().unwrap(), 8080);
    }

    #[test]
    fn mixed_entries_keep_independent_keys() {
        let mut args = args!["first", "name" => "n", "second"];
        assert_eq!(args.len(), 3);
        // Positional indices skip over named entries.
        assert_eq!(args.take_position(1).unwrap().as_str(), Some("second"));
        assert_eq!(args.take_named("name").unwrap().as_str(), Some("n"));
        assert_eq!(args.take_position(0).unwrap().as_str(), Some("first"));
    }
}
