//! Relationship Traits - the contract a union needs from its member relations
//!
//! A union never touches storage. Every read and write goes through one of
//! these traits, implemented by whatever persists the individual relation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ModelResult;
use crate::model::TypeTag;

use super::metadata::{Cardinality, RelationshipMetadata, RelationshipType};

/// A has-many style relation from `Owner` to records of type `Related`
#[async_trait]
pub trait CollectionRelation<Owner, Related>: Send + Sync {
    /// Relation name as declared on the owner
    fn name(&self) -> &str;

    /// The nominal type of record this relation accepts
    fn related_type(&self) -> TypeTag;

    /// Current related records
    async fn fetch_current(&self, owner: &Owner) -> ModelResult<Vec<Related>>;

    /// Add one record
    async fn append(&self, owner: &Owner, record: Related) -> ModelResult<()>;

    /// Replace the full contents
    async fn replace(&self, owner: &Owner, records: Vec<Related>) -> ModelResult<()>;

    /// Unlink the given records
    async fn delete(&self, owner: &Owner, records: Vec<Related>) -> ModelResult<()>;

    /// Unlink the given records and destroy them
    async fn destroy(&self, owner: &Owner, records: Vec<Related>) -> ModelResult<()>;

    async fn delete_all(&self, owner: &Owner) -> ModelResult<()>;

    async fn destroy_all(&self, owner: &Owner) -> ModelResult<()>;

    /// Drop anything the relation cached for this owner
    async fn reload(&self, owner: &Owner) -> ModelResult<()>;
}

/// A has-one style relation from `Owner` to an optional `Related`
#[async_trait]
pub trait SingleRelation<Owner, Related>: Send + Sync {
    /// Relation name as declared on the owner
    fn name(&self) -> &str;

    /// The nominal type of record this relation accepts
    fn related_type(&self) -> TypeTag;

    async fn fetch_current(&self, owner: &Owner) -> ModelResult<Option<Related>>;

    /// Full replace; `None` clears the reference
    async fn set(&self, owner: &Owner, record: Option<Related>) -> ModelResult<()>;

    /// Unlink the current record
    async fn delete(&self, owner: &Owner) -> ModelResult<()>;

    /// Unlink the current record and destroy it
    async fn destroy(&self, owner: &Owner) -> ModelResult<()>;

    async fn reload(&self, owner: &Owner) -> ModelResult<()>;
}

/// A declared relation as seen by a union: either kind, shared
pub enum Member<Owner, Related> {
    Collection(Arc<dyn CollectionRelation<Owner, Related>>),
    Single(Arc<dyn SingleRelation<Owner, Related>>),
}

impl<Owner, Related> Member<Owner, Related> {
    pub fn name(&self) -> &str {
        match self {
            Member::Collection(relation) => relation.name(),
            Member::Single(relation) => relation.name(),
        }
    }

    pub fn related_type(&self) -> TypeTag {
        match self {
            Member::Collection(relation) => relation.related_type(),
            Member::Single(relation) => relation.related_type(),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Member::Collection(_))
    }

    pub fn cardinality(&self) -> Cardinality {
        if self.is_collection() {
            Cardinality::Collection
        } else {
            Cardinality::Single
        }
    }

    /// Reflection metadata for this relation
    pub fn metadata(&self) -> RelationshipMetadata {
        let relationship_type = if self.is_collection() {
            RelationshipType::HasMany
        } else {
            RelationshipType::HasOne
        };
        RelationshipMetadata::new(relationship_type, self.name().to_string(), self.related_type())
    }
}

// Derive would bound `Owner` and `Related` by `Clone`.
impl<Owner, Related> Clone for Member<Owner, Related> {
    fn clone(&self) -> Self {
        match self {
            Member::Collection(relation) => Member::Collection(Arc::clone(relation)),
            Member::Single(relation) => Member::Single(Arc::clone(relation)),
        }
    }
}

impl<Owner, Related> std::fmt::Debug for Member<Owner, Related> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name())
            .field("related_type", &self.related_type())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}
