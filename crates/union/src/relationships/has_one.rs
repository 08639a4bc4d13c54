//! HasOne Relationship - in-memory single-reference relation

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, Morph, TypeTag};

use super::traits::SingleRelation;

/// HasOne relationship - owner has at most one related record
pub struct HasOne<Owner, Related> {
    name: String,
    related_type: TypeTag,
    rows: RwLock<HashMap<String, Related>>,
    destroyed: RwLock<Vec<Related>>,
    _owner: PhantomData<fn(&Owner)>,
}

impl<Owner, Related> HasOne<Owner, Related>
where
    Owner: Model,
    Related: Morph,
{
    /// Create a new, empty HasOne relation
    pub fn new(name: &str, related_type: impl Into<TypeTag>) -> Self {
        Self {
            name: name.to_string(),
            related_type: related_type.into(),
            rows: RwLock::new(HashMap::new()),
            destroyed: RwLock::new(Vec::new()),
            _owner: PhantomData,
        }
    }

    /// The record currently related to `owner`
    pub async fn record(&self, owner: &Owner) -> ModelResult<Option<Related>> {
        let key = owner.storage_key()?;
        Ok(self.rows.read().await.get(&key).cloned())
    }

    /// Store a record for an owner without going through a union
    pub async fn seed(&self, owner: &Owner, record: Option<Related>) -> ModelResult<()> {
        let key = owner.storage_key()?;
        match record {
            Some(record) => {
                if !record.morph_lineage().contains(&self.related_type) {
                    return Err(ModelError::Relationship(format!(
                        "relation '{}' accepts {} records, got {}",
                        self.name,
                        self.related_type,
                        record.morph_type()
                    )));
                }
                self.rows.write().await.insert(key, record);
            }
            None => {
                self.rows.write().await.remove(&key);
            }
        }
        Ok(())
    }

    /// Every record destroyed through this relation, oldest first
    pub async fn destroyed(&self) -> Vec<Related> {
        self.destroyed.read().await.clone()
    }

    async fn take(&self, owner: &Owner) -> ModelResult<Option<Related>> {
        let key = owner.storage_key()?;
        Ok(self.rows.write().await.remove(&key))
    }
}

#[async_trait]
impl<Owner, Related> SingleRelation<Owner, Related> for HasOne<Owner, Related>
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

    async fn fetch_current(&self, owner: &Owner) -> ModelResult<Option<Related>> {
        self.record(owner).await
    }

    async fn set(&self, owner: &Owner, record: Option<Related>) -> ModelResult<()> {
        self.seed(owner, record).await
    }

    async fn delete(&self, owner: &Owner) -> ModelResult<()> {
        self.take(owner).await?;
        Ok(())
    }

    async fn destroy(&self, owner: &Owner) -> ModelResult<()> {
        if let Some(record) = self.take(owner).await? {
            self.destroyed.write().await.push(record);
        }
        Ok(())
    }

    async fn reload(&self, owner: &Owner) -> ModelResult<()> {
        owner.storage_key()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::test_support::{Garage, Ingredient};

    #[tokio::test]
    async fn test_set_and_clear() {
        let garage = Garage::new(7);
        let meat = HasOne::<Garage, Ingredient>::new("meat", "Meat");

        assert_eq!(meat.fetch_current(&garage).await.unwrap(), None);

        meat.set(&garage, Some(Ingredient::meat(1))).await.unwrap();
        assert_eq!(
            meat.fetch_current(&garage).await.unwrap(),
            Some(Ingredient::meat(1))
        );

        meat.set(&garage, None).await.unwrap();
        assert_eq!(meat.fetch_current(&garage).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_other_types() {
        let garage = Garage::new(7);
        let meat = HasOne::<Garage, Ingredient>::new("meat", "Meat");

        let result = meat.set(&garage, Some(Ingredient::veg(1))).await;
        assert!(matches!(result, Err(ModelError::Relationship(_))));
    }

    #[tokio::test]
    async fn test_destroy_records_value() {
        let garage = Garage::new(7);
        let meat = HasOne::<Garage, Ingredient>::new("meat", "Meat");
        meat.seed(&garage, Some(Ingredient::meat(3))).await.unwrap();

        meat.destroy(&garage).await.unwrap();
        meat.destroy(&garage).await.unwrap();

        assert_eq!(meat.record(&garage).await.unwrap(), None);
        assert_eq!(meat.destroyed().await, vec![Ingredient::meat(3)]);
    }

    #[tokio::test]
    async fn test_unsaved_owner_is_rejected() {
        let unsaved = Garage { id: None };
        let meat = HasOne::<Garage, Ingredient>::new("meat", "Meat");

        assert_eq!(
            meat.set(&unsaved, Some(Ingredient::meat(1))).await,
            Err(ModelError::MissingPrimaryKey)
        );
        assert_eq!(
            meat.fetch_current(&Garage { id: None }).await,
            Err(ModelError::MissingPrimaryKey)
        );
        assert_eq!(meat.destroy(&unsaved).await, Err(ModelError::MissingPrimaryKey));
    }
}
