//! HasMany Relationship - in-memory collection relation
//!
//! Keeps related records per owner primary key. Used by tests and by
//! embedders that hold relations in memory; database-backed relations
//! implement `CollectionRelation` themselves.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, Morph, TypeTag};

use super::traits::CollectionRelation;

/// HasMany relationship - owner has many related records of one nominal type
pub struct HasMany<Owner, Related> {
    name: String,
    related_type: TypeTag,
    rows: RwLock<HashMap<String, Vec<Related>>>,
    destroyed: RwLock<Vec<Related>>,
    _owner: PhantomData<fn(&Owner)>,
}

impl<Owner, Related> HasMany<Owner, Related>
where
    Owner: Model,
    Related: Morph,
{
    /// Create a new, empty HasMany relation
    pub fn new(name: &str, related_type: impl Into<TypeTag>) -> Self {
        Self {
            name: name.to_string(),
            related_type: related_type.into(),
            rows: RwLock::new(HashMap::new()),
            destroyed: RwLock::new(Vec::new()),
            _owner: PhantomData,
        }
    }

    /// Store records for an owner without going through a union
    pub async fn seed(&self, owner: &Owner, records: Vec<Related>) -> ModelResult<()> {
        let key = owner.storage_key()?;
        for record in &records {
            self.check_accepts(record)?;
        }
        self.rows.write().await.insert(key, records);
        Ok(())
    }

    /// Records currently related to `owner`
    pub async fn records(&self, owner: &Owner) -> ModelResult<Vec<Related>> {
        let key = owner.storage_key()?;
        Ok(self.rows.read().await.get(&key).cloned().unwrap_or_default())
    }

    /// Every record destroyed through this relation, oldest first
    pub async fn destroyed(&self) -> Vec<Related> {
        self.destroyed.read().await.clone()
    }

    fn check_accepts(&self, record: &Related) -> ModelResult<()> {
        if record.morph_lineage().contains(&self.related_type) {
            Ok(())
        } else {
            Err(ModelError::Relationship(format!(
                "relation '{}' accepts {} records, got {}",
                self.name,
                self.related_type,
                record.morph_type()
            )))
        }
    }

    /// Remove `records` from the owner's rows, returning what was removed
    async fn remove(&self, owner: &Owner, records: &[Related]) -> ModelResult<Vec<Related>> {
        let key = owner.storage_key()?;
        let mut rows = self.rows.write().await;
        let Some(current) = rows.get_mut(&key) else {
            return Ok(Vec::new());
        };

        let mut removed = Vec::new();
        current.retain(|record| {
            if records.contains(record) {
                removed.push(record.clone());
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[async_trait]
impl<Owner, Related> CollectionRelation<Owner, Related> for HasMany<Owner, Related>
where
    Owner: Model,
    Related: Morph,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn related_type(&self) -> TypeTag {
        self.related_type.clone()
    }

    async fn fetch_current(&self, owner: &Owner) -> ModelResult<Vec<Related>> {
        self.records(owner).await
    }

    async fn append(&self, owner: &Owner, record: Related) -> ModelResult<()> {
        let key = owner.storage_key()?;
        self.check_accepts(&record)?;
        self.rows.write().await.entry(key).or_default().push(record);
        Ok(())
    }

    async fn replace(&self, owner: &Owner, records: Vec<Related>) -> ModelResult<()> {
        self.seed(owner, records).await
    }

    async fn delete(&self, owner: &Owner, records: Vec<Related>) -> ModelResult<()> {
        self.remove(owner, &records).await?;
        Ok(())
    }

    async fn destroy(&self, owner: &Owner, records: Vec<Related>) -> ModelResult<()> {
        let removed = self.remove(owner, &records).await?;
        self.destroyed.write().await.extend(removed);
        Ok(())
    }

    async fn delete_all(&self, owner: &Owner) -> ModelResult<()> {
        let key = owner.storage_key()?;
        self.rows.write().await.remove(&key);
        Ok(())
    }

    async fn destroy_all(&self, owner: &Owner) -> ModelResult<()> {
        let key = owner.storage_key()?;
        let removed = self.rows.write().await.remove(&key).unwrap_or_default();
        self.destroyed.write().await.extend(removed);
        Ok(())
    }

    async fn reload(&self, owner: &Owner) -> ModelResult<()> {
        // Rows live in memory; there is nothing stale to drop.
        owner.storage_key()?;
        Ok(())
    }
}
