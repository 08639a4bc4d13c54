//! Union Relations - one accessor over several typed relations
//!
//! A union joins several has-many relations (or several has-one relations)
//! of a model into one logical relation:
//!
//! - `registry`: declaration, validation and the frozen per-model schema
//! - `definition`: member list, cardinality and type dispatch of one union
//! - `proxy`: runtime fan-out, merging and cache maintenance
//! - `handle`: entity instances and the handles call sites work with

pub mod cache;
pub mod config;
pub mod definition;
pub mod handle;
pub mod proxy;
pub mod registry;


pub use cache::CacheState;
pub use config::UnionOptions;
pub use definition::{UnionDefinition, UnionMembers};
pub use handle::{Instance, UnionHandle, UNSUPPORTED_OPERATIONS};
pub use proxy::{Assignment, UnionProxy};
pub use registry::{EntitySchema, SchemaBuilder};
