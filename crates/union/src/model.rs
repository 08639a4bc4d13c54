//! Model traits - the owning entity and the records a union relates
//!
//! `Model` is the slice of the ORM's model contract that union relations
//! need. `Morph` describes a related record's runtime type so the union can
//! decide which member relation owns it.

use std::borrow::Cow;
use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Core trait for entities that declare relations
pub trait Model: Send + Sync + Debug + 'static {
    /// The type used for this model's primary key
    type PrimaryKey: Clone + Send + Sync + Debug + Display;

    /// Table name for this model
    fn table_name() -> &'static str;

    /// Get the primary key value for this model instance
    fn primary_key(&self) -> Option<Self::PrimaryKey>;

    /// Primary key rendered for logs; empty when unsaved
    fn key_string(&self) -> String {
        self.primary_key()
            .map(|key| key.to_string())
            .unwrap_or_default()
    }

    /// Primary key rendered as a storage key; unsaved models have none
    fn storage_key(&self) -> ModelResult<String> {
        self.primary_key()
            .map(|key| key.to_string())
            .ok_or(ModelError::MissingPrimaryKey)
    }
}

/// Nominal type name of a related record ("Car", "Bike")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(Cow<'static, str>);

impl TypeTag {
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TypeTag {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record that can be related through a union.
///
/// All records of one union share a Rust type (usually an enum over the
/// concrete records); `morph_type` tells them apart at runtime.
pub trait Morph: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// The record's own type tag
    fn morph_type(&self) -> TypeTag;

    /// Own tag first, then every supertype the record is-a
    fn morph_lineage(&self) -> Vec<TypeTag> {
        vec![self.morph_type()]
    }
}
