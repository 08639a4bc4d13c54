//! Union Proxy - fans operations out to member relations
//!
//! A proxy belongs to one entity instance and one union. It never stores the
//! entity; every operation receives it as `owner`. Collection proxies keep
//! the merged view in a `CacheState`; single proxies re-read on every call.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ModelResult, UnionError};
use crate::model::{Model, Morph};
use crate::relationships::Cardinality;

use super::cache::CacheState;
use super::definition::{UnionDefinition, UnionMembers};

/// Value assigned to a union through its mutator
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment<R> {
    /// A full sequence; valid for collection unions
    Many(Vec<R>),
    /// One record or nothing; valid for single unions
    One(Option<R>),
}

impl<R> Assignment<R> {
    pub fn many(records: Vec<R>) -> Self {
        Assignment::Many(records)
    }

    pub fn one(record: R) -> Self {
        Assignment::One(Some(record))
    }

    pub fn none() -> Self {
        Assignment::One(None)
    }

    fn cardinality(&self) -> Cardinality {
        match self {
            Assignment::Many(_) => Cardinality::Collection,
            Assignment::One(_) => Cardinality::Single,
        }
    }
}

impl<R> From<Vec<R>> for Assignment<R> {
    fn from(records: Vec<R>) -> Self {
        Assignment::Many(records)
    }
}

impl<R> From<Option<R>> for Assignment<R> {
    fn from(record: Option<R>) -> Self {
        Assignment::One(record)
    }
}

/// Runtime state of one union on one entity instance
pub struct UnionProxy<E, R> {
    definition: Arc<UnionDefinition<E, R>>,
    cache: CacheState<R>,
}

impl<E, R> UnionProxy<E, R>
where
    E: Model,
    R: Morph,
{
    pub fn new(definition: Arc<UnionDefinition<E, R>>) -> Self {
        Self {
            definition,
            cache: CacheState::Uncached,
        }
    }

    pub fn definition(&self) -> &UnionDefinition<E, R> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.definition.cardinality()
    }

    pub fn cache(&self) -> &CacheState<R> {
        &self.cache
    }

    /// Name of the member relation owning `record`, if any
    pub fn detect_member_for(&self, record: &R) -> Option<&str> {
        self.definition
            .detect_member_for(record)
            .map(|index| self.definition.member_names()[index].as_str())
    }

    pub(crate) fn require(&self, cardinality: Cardinality, operation: &str) -> ModelResult<()> {
        if self.cardinality() == cardinality {
            Ok(())
        } else {
            Err(UnionError::WrongCardinalityUse {
                union: self.name().to_string(),
                operation: operation.to_string(),
                cardinality: self.cardinality().as_str(),
            }
            .into())
        }
    }

    pub(crate) fn unsupported<T>(&self, operation: &str) -> ModelResult<T> {
        Err(UnionError::UnsupportedOperation {
            union: self.name().to_string(),
            operation: operation.to_string(),
        }
        .into())
    }

    fn invalidate(&mut self) {
        if self.cache.invalidate() {
            debug!("Invalidated merged view of union '{}'", self.name());
        }
    }

    /// Invalidate the cache when a multi-member write failed part way
    fn settle<T>(&mut self, result: ModelResult<T>) -> ModelResult<T> {
        if let Err(ref err) = result {
            warn!("Union '{}' operation failed: {}", self.name(), err);
            self.invalidate();
        }
        result
    }

    /// The merged view of a collection union.
    ///
    /// Served from the cache unless `force` is set or nothing is cached.
    pub async fn load(&mut self, owner: &E, force: bool) -> ModelResult<&[R]> {
        self.require(Cardinality::Collection, "load")?;

        if force || !self.cache.is_cached() {
            self.invalidate();
            let merged = self.fetch_merged(owner).await?;
            debug!(
                "Loaded {} records into union '{}' for {} {}",
                merged.len(),
                self.name(),
                E::table_name(),
                owner.key_string()
            );
            return Ok(self.cache.fill(merged));
        }

        Ok(self.cache.get().unwrap_or(&[]))
    }

    async fn fetch_merged(&self, owner: &E) -> ModelResult<Vec<R>> {
        let mut merged = Vec::new();
        if let UnionMembers::Collection(members) = self.definition.members() {
            for member in members {
                merged.extend(member.fetch_current(owner).await?);
            }
        }
        Ok(merged)
    }

    /// Current record of a single union; the first member holding a value wins
    pub async fn get(&self, owner: &E) -> ModelResult<Option<R>> {
        self.require(Cardinality::Single, "get")?;

        let UnionMembers::Single(members) = self.definition.members() else {
            return Ok(None);
        };

        let mut found: Option<R> = None;
        let mut holders = Vec::new();
        for member in members {
            if let Some(record) = member.fetch_current(owner).await? {
                holders.push(member.name().to_string());
                if found.is_none() {
                    found = Some(record);
                }
            }
        }

        if holders.len() > 1 {
            if self.definition.options().strict_single {
                return Err(UnionError::AmbiguousSingle {
                    union: self.name().to_string(),
                    members: holders,
                }
                .into());
            }
            warn!(
                "Union '{}' on {} {} has values in {:?}; using '{}'",
                self.name(),
                E::table_name(),
                owner.key_string(),
                holders,
                holders[0]
            );
        }

        Ok(found)
    }

    /// Current contents as a sequence: the merged view, or zero/one record
    pub async fn to_vec(&mut self, owner: &E) -> ModelResult<Vec<R>> {
        match self.cardinality() {
            Cardinality::Collection => Ok(self.load(owner, false).await?.to_vec()),
            Cardinality::Single => Ok(self.get(owner).await?.into_iter().collect()),
        }
    }

    /// Append `record` to the member owning its type.
    ///
    /// Returns `false` without touching anything when no member owns it.
    pub async fn push(&mut self, owner: &E, record: R) -> ModelResult<bool> {
        self.require(Cardinality::Collection, "push")?;

        let Some(index) = self.definition.detect_member_for(&record) else {
            debug!(
                "Union '{}' ignored foreign {} record on push",
                self.name(),
                record.morph_type()
            );
            return Ok(false);
        };

        let definition = Arc::clone(&self.definition);
        if let UnionMembers::Collection(members) = definition.members() {
            let member = &members[index];
            debug!("Union '{}' appending {} to '{}'", self.name(), record.morph_type(), member.name());
            let result = member.append(owner, record).await;
            self.settle(result)?;
        }

        self.load(owner, true).await?;
        Ok(true)
    }

    /// Unlink `records` from the members owning them
    pub async fn delete(&mut self, owner: &E, records: Vec<R>) -> ModelResult<()> {
        let result = self.remove_records(owner, records, false).await;
        self.settle(result)?;
        self.refresh(owner).await
    }

    /// Unlink `records` from the members owning them and destroy them
    pub async fn destroy(&mut self, owner: &E, records: Vec<R>) -> ModelResult<()> {
        let result = self.remove_records(owner, records, true).await;
        self.settle(result)?;
        self.refresh(owner).await
    }

    async fn remove_records(&self, owner: &E, records: Vec<R>, destroy: bool) -> ModelResult<()> {
        let (partitions, foreign) = self.definition.partition(records);
        if foreign > 0 {
            debug!("Union '{}' ignored {} foreign records", self.name(), foreign);
        }

        match self.definition.members() {
            UnionMembers::Collection(members) => {
                for (member, records) in members.iter().zip(partitions) {
                    if records.is_empty() {
                        continue;
                    }
                    if destroy {
                        member.destroy(owner, records).await?;
                    } else {
                        member.delete(owner, records).await?;
                    }
                }
            }
            UnionMembers::Single(members) => {
                for (member, records) in members.iter().zip(partitions) {
                    if records.is_empty() {
                        continue;
                    }
                    let Some(current) = member.fetch_current(owner).await? else {
                        continue;
                    };
                    if !records.contains(&current) {
                        continue;
                    }
                    if destroy {
                        member.destroy(owner).await?;
                    } else {
                        member.delete(owner).await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Unlink everything from every member
    pub async fn delete_all(&mut self, owner: &E) -> ModelResult<()> {
        let result = self.remove_all(owner, false).await;
        self.settle(result)?;
        self.invalidate();
        Ok(())
    }

    /// Unlink and destroy everything in every member
    pub async fn destroy_all(&mut self, owner: &E) -> ModelResult<()> {
        let result = self.remove_all(owner, true).await;
        self.settle(result)?;
        self.invalidate();
        Ok(())
    }

    async fn remove_all(&self, owner: &E, destroy: bool) -> ModelResult<()> {
        match self.definition.members() {
            UnionMembers::Collection(members) => {
                for member in members {
                    if destroy {
                        member.destroy_all(owner).await?;
                    } else {
                        member.delete_all(owner).await?;
                    }
                }
            }
            UnionMembers::Single(members) => {
                for member in members {
                    if destroy {
                        member.destroy(owner).await?;
                    } else {
                        member.delete(owner).await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Reload every member, then rebuild the merged view
    pub async fn reload(&mut self, owner: &E) -> ModelResult<()> {
        let result = self.reload_members(owner).await;
        self.settle(result)?;
        self.refresh(owner).await
    }

    async fn reload_members(&self, owner: &E) -> ModelResult<()> {
        match self.definition.members() {
            UnionMembers::Collection(members) => {
                for member in members {
                    member.reload(owner).await?;
                }
            }
            UnionMembers::Single(members) => {
                for member in members {
                    member.reload(owner).await?;
                }
            }
        }
        Ok(())
    }

    /// Replace the union's contents.
    ///
    /// Collection unions replace every member with its share of the
    /// sequence. Single unions give the record to its member and clear all
    /// others; a foreign record or `None` clears every member.
    pub async fn set(&mut self, owner: &E, value: Assignment<R>) -> ModelResult<()> {
        if value.cardinality() != self.cardinality() {
            return Err(UnionError::ShapeMismatch {
                union: self.name().to_string(),
            }
            .into());
        }

        let records = match value {
            Assignment::Many(records) => records,
            Assignment::One(record) => record.into_iter().collect(),
        };
        let (partitions, foreign) = self.definition.partition(records);
        if foreign > 0 {
            warn!(
                "Union '{}' dropped {} foreign records on assignment",
                self.name(),
                foreign
            );
        }

        let result = self.assign_partitions(owner, partitions).await;
        self.settle(result)?;
        self.refresh(owner).await
    }

    async fn assign_partitions(&self, owner: &E, partitions: Vec<Vec<R>>) -> ModelResult<()> {
        match self.definition.members() {
            UnionMembers::Collection(members) => {
                for (member, records) in members.iter().zip(partitions) {
                    member.replace(owner, records).await?;
                }
            }
            UnionMembers::Single(members) => {
                for (member, records) in members.iter().zip(partitions) {
                    member.set(owner, records.into_iter().next()).await?;
                }
            }
        }
        Ok(())
    }

    /// Compute a new desired sequence from the merged view and assign it
    pub async fn edit<T, F>(&mut self, owner: &E, operation: &str, f: F) -> ModelResult<T>
    where
        F: FnOnce(&mut Vec<R>) -> T,
    {
        self.require(Cardinality::Collection, operation)?;

        let mut desired = self.load(owner, false).await?.to_vec();
        let output = f(&mut desired);
        debug!("Union '{}' reassigning after '{}'", self.name(), operation);
        self.set(owner, Assignment::Many(desired)).await?;
        Ok(output)
    }

    /// Rebuild the cache for collections after a write
    async fn refresh(&mut self, owner: &E) -> ModelResult<()> {
        if self.cardinality().is_collection() {
            self.load(owner, true).await?;
        }
        Ok(())
    }
}

impl<E, R> std::fmt::Debug for UnionProxy<E, R>
where
    R: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionProxy")
            .field("definition", &self.definition)
            .field("cache", &self.cache)
            .finish()
    }
}
