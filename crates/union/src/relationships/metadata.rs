//! Relationship Metadata - reflection data for declared relations and unions

use serde::{Deserialize, Serialize};

use crate::model::TypeTag;

/// Defines the type of relationship between models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    /// One-to-one relationship (hasOne)
    HasOne,
    /// One-to-many relationship (hasMany)
    HasMany,
}

impl RelationshipType {
    /// Returns true if this relationship returns a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::HasMany)
    }

    pub fn cardinality(self) -> Cardinality {
        match self {
            Self::HasMany => Cardinality::Collection,
            Self::HasOne => Cardinality::Single,
        }
    }
}

/// Whether a relation (or a union of relations) yields many records or at most one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    Collection,
    Single,
}

impl Cardinality {
    pub fn is_collection(self) -> bool {
        matches!(self, Self::Collection)
    }

    /// Human readable name used in error messages
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Single => "single",
        }
    }

    pub fn relationship_type(self) -> RelationshipType {
        match self {
            Self::Collection => RelationshipType::HasMany,
            Self::Single => RelationshipType::HasOne,
        }
    }
}

/// Reflection metadata for a relation or a union.
///
/// For unions, `related_type` comes from the representative member and
/// `members` lists the constituent relations in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipMetadata {
    /// The type of relationship
    pub relationship_type: RelationshipType,

    /// Name of the relationship (accessor name on the model)
    pub name: String,

    /// The related record's type tag
    pub related_type: TypeTag,

    /// Constituent relations, empty for plain relations
    pub members: Vec<String>,

    /// Name of the member that supplied `related_type`
    pub representative: Option<String>,
}

impl RelationshipMetadata {
    /// Create metadata for a plain relation
    pub fn new(relationship_type: RelationshipType, name: String, related_type: TypeTag) -> Self {
        Self {
            relationship_type,
            name,
            related_type,
            members: Vec::new(),
            representative: None,
        }
    }

    /// Record the union members this metadata reflects
    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = members;
        self
    }

    /// Record which member supplied the nominal related type
    pub fn with_representative(mut self, representative: String) -> Self {
        self.representative = Some(representative);
        self
    }

    pub fn is_union(&self) -> bool {
        !self.members.is_empty()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.relationship_type.cardinality()
    }
}
