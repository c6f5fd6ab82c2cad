pub mod autowire;
pub mod container;
pub mod definition;
pub mod error;
pub mod inspect;
pub mod macros;
pub mod params;
pub mod resolver;
pub mod value;

pub use autowire::*;
pub use container::*;
pub use definition::*;
pub use error::*;
pub use inspect::*;
pub use params::*;
pub use resolver::*;
pub use value::*;
