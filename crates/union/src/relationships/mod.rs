//! Relationships Module - member relation contract and in-memory relations

pub mod traits;
pub mod has_one;
pub mod has_many;
pub mod metadata;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types
pub use traits::*;
pub use has_one::*;
pub use has_many::*;
pub use metadata::*;
