//! # elif-union: union relations for elif.rs models
//!
//! Lets a model expose one relation ("vehicles") that is the union of several
//! independently declared relations ("cars", "bikes"). Each member relation
//! keeps its own storage; the union dispatches reads and writes to them by
//! the runtime type of the records involved.
//!
//! ```ignore
//! let mut builder = EntitySchema::<Street>::builder();
//! builder.has_many(cars)?.has_many(bikes)?;
//! builder.declare_union::<Vehicle>("vehicles", &["cars", "bikes"], UnionOptions::default())?;
//! let schema = builder.build();
//!
//! let mut street = Instance::new(Street::new(1), schema);
//! street.union::<Vehicle>("vehicles")?.push(Vehicle::Bike(7)).await?;
//! ```

pub mod error;
pub mod model;
pub mod relationships;
pub mod unions;

// Re-export core traits and types
pub use error::*;
pub use model::*;
pub use relationships::*;
pub use unions::*;
