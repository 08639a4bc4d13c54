//! Entity instances and the union handles they hand out
//!
//! `Instance` owns a model value together with the union proxies memoized
//! for it. `UnionHandle` pairs a borrowed model with its proxy, so a handle
//! can never outlive the entity it belongs to.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, Morph};
use crate::relationships::Cardinality;

use super::proxy::{Assignment, UnionProxy};
use super::registry::EntitySchema;

/// Operations that only make sense on one concrete relation type
pub const UNSUPPORTED_OPERATIONS: &[&str] = &["find", "create", "build", "concat"];

const COLLECTION_OPERATIONS: &[&str] = &[
    "push", "load", "len", "is_empty", "first", "last", "at", "contains", "position", "edit",
    "reverse", "sort_by", "retain", "dedup", "rotate_left", "truncate", "pop",
];

const SINGLE_OPERATIONS: &[&str] = &["get", "is_none", "with_current"];

const SHARED_OPERATIONS: &[&str] = &[
    "set", "to_vec", "delete", "destroy", "delete_all", "destroy_all", "clear", "reload",
    "inspect", "to_json",
];

/// A model value plus its memoized union proxies
pub struct Instance<E: Model> {
    entity: E,
    schema: Arc<EntitySchema<E>>,
    proxies: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl<E: Model> Instance<E> {
    pub fn new(entity: E, schema: Arc<EntitySchema<E>>) -> Self {
        Self {
            entity,
            schema,
            proxies: HashMap::new(),
        }
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// Mutable access to the entity.
    ///
    /// Memoized proxies are dropped, since an edit may change the primary key
    /// their cached views were loaded for.
    pub fn entity_mut(&mut self) -> &mut E {
        self.proxies.clear();
        &mut self.entity
    }

    pub fn into_inner(self) -> E {
        self.entity
    }

    pub fn schema(&self) -> &EntitySchema<E> {
        &self.schema
    }

    /// Whether a proxy has been created for `name`
    pub fn has_proxy(&self, name: &str) -> bool {
        self.proxies.contains_key(name)
    }

    /// Accessor: the handle for union `name`, creating its proxy on first use
    pub fn union<R: Morph>(&mut self, name: &str) -> ModelResult<UnionHandle<'_, E, R>> {
        if !self.proxies.contains_key(name) {
            let definition = self.schema.union_definition::<R>(name)?;
            debug!("Creating proxy for union '{}' on {}", name, E::table_name());
            self.proxies
                .insert(name.to_string(), Box::new(UnionProxy::new(definition)));
        }

        let proxy = self
            .proxies
            .get_mut(name)
            .and_then(|slot| slot.downcast_mut::<UnionProxy<E, R>>())
            .ok_or_else(|| {
                ModelError::Configuration(format!(
                    "union '{}' on {} relates a different record type",
                    name,
                    E::table_name()
                ))
            })?;

        Ok(UnionHandle {
            owner: &self.entity,
            proxy,
        })
    }

    /// Mutator: assign `value` to union `name`
    pub async fn assign<R: Morph>(&mut self, name: &str, value: impl Into<Assignment<R>>) -> ModelResult<()> {
        self.union::<R>(name)?.set(value).await
    }

    /// Forget every memoized proxy; the next access re-reads members
    pub fn reload(&mut self) {
        self.proxies.clear();
    }
}

impl<E: Model> std::fmt::Debug for Instance<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut proxies: Vec<&String> = self.proxies.keys().collect();
        proxies.sort();
        f.debug_struct("Instance")
            .field("entity", &self.entity)
            .field("proxies", &proxies)
            .finish()
    }
}

/// One union of one entity, ready to use
pub struct UnionHandle<'a, E, R> {
    owner: &'a E,
    proxy: &'a mut UnionProxy<E, R>,
}

impl<'a, E, R> std::fmt::Debug for UnionHandle<'a, E, R>
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionHandle")
            .field("owner", &self.owner)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl<'a, E, R> UnionHandle<'a, E, R>
where
    E: Model,
    R: Morph,
{
    /// Build a handle over a proxy held outside an `Instance`
    pub fn new(owner: &'a E, proxy: &'a mut UnionProxy<E, R>) -> Self {
        Self { owner, proxy }
    }

    pub fn name(&self) -> &str {
        self.proxy.name()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.proxy.cardinality()
    }

    pub fn is_collection(&self) -> bool {
        self.cardinality().is_collection()
    }

    /// Whether this handle can perform `operation`
    pub fn supports(&self, operation: &str) -> bool {
        if UNSUPPORTED_OPERATIONS.contains(&operation) {
            return false;
        }
        let specific = match self.cardinality() {
            Cardinality::Collection => COLLECTION_OPERATIONS,
            Cardinality::Single => SINGLE_OPERATIONS,
        };
        specific.contains(&operation) || SHARED_OPERATIONS.contains(&operation)
    }

    /// Whether the merged view is currently cached
    pub fn is_cached(&self) -> bool {
        self.proxy.cache().is_cached()
    }

    /// Name of the member relation that would own `record`
    pub fn detect_member_for(&self, record: &R) -> Option<&str> {
        self.proxy.detect_member_for(record)
    }

    // --- reads ---

    /// Current record of a single union
    pub async fn get(&self) -> ModelResult<Option<R>> {
        self.proxy.get(self.owner).await
    }

    /// Merged view of a collection union; `force` re-reads every member
    pub async fn load(&mut self, force: bool) -> ModelResult<&[R]> {
        self.proxy.load(self.owner, force).await
    }

    pub async fn to_vec(&mut self) -> ModelResult<Vec<R>> {
        self.proxy.to_vec(self.owner).await
    }

    pub async fn is_none(&self) -> ModelResult<bool> {
        Ok(self.get().await?.is_none())
    }

    /// Run `f` against the current record of a single union
    pub async fn with_current<T, F>(&self, f: F) -> ModelResult<Option<T>>
    where
        F: FnOnce(&R) -> T,
    {
        Ok(self.get().await?.as_ref().map(f))
    }

    pub async fn len(&mut self) -> ModelResult<usize> {
        Ok(self.load(false).await?.len())
    }

    pub async fn is_empty(&mut self) -> ModelResult<bool> {
        Ok(self.load(false).await?.is_empty())
    }

    pub async fn first(&mut self) -> ModelResult<Option<R>> {
        Ok(self.load(false).await?.first().cloned())
    }

    pub async fn last(&mut self) -> ModelResult<Option<R>> {
        Ok(self.load(false).await?.last().cloned())
    }

    /// Record at `index` in the merged view
    pub async fn at(&mut self, index: usize) -> ModelResult<Option<R>> {
        Ok(self.load(false).await?.get(index).cloned())
    }

    pub async fn contains(&mut self, record: &R) -> ModelResult<bool> {
        Ok(self.load(false).await?.contains(record))
    }

    pub async fn position<P>(&mut self, predicate: P) -> ModelResult<Option<usize>>
    where
        P: FnMut(&R) -> bool,
    {
        Ok(self.load(false).await?.iter().position(predicate))
    }

    /// Debug rendering of the current view
    pub async fn inspect(&mut self) -> ModelResult<String> {
        match self.cardinality() {
            Cardinality::Collection => Ok(format!("{:?}", self.load(false).await?)),
            Cardinality::Single => Ok(format!("{:?}", self.get().await?)),
        }
    }

    /// JSON array for collection unions, the record or `null` for single ones
    pub async fn to_json(&mut self) -> ModelResult<serde_json::Value>
    where
        R: Serialize,
    {
        let value = match self.cardinality() {
            Cardinality::Collection => serde_json::to_value(self.load(false).await?)?,
            Cardinality::Single => serde_json::to_value(self.get().await?)?,
        };
        Ok(value)
    }

    // --- writes ---

    /// Append a record to the member owning its type.
    ///
    /// Records no member owns are ignored.
    pub async fn push(&mut self, record: R) -> ModelResult<&mut Self> {
        self.proxy.push(self.owner, record).await?;
        Ok(self)
    }

    pub async fn set(&mut self, value: impl Into<Assignment<R>>) -> ModelResult<()> {
        self.proxy.set(self.owner, value.into()).await
    }

    pub async fn delete(&mut self, records: Vec<R>) -> ModelResult<()> {
        self.proxy.delete(self.owner, records).await
    }

    pub async fn destroy(&mut self, records: Vec<R>) -> ModelResult<()> {
        self.proxy.destroy(self.owner, records).await
    }

    pub async fn delete_all(&mut self) -> ModelResult<()> {
        self.proxy.delete_all(self.owner).await
    }

    pub async fn destroy_all(&mut self) -> ModelResult<()> {
        self.proxy.destroy_all(self.owner).await
    }

    /// Unlink everything from every member
    pub async fn clear(&mut self) -> ModelResult<&mut Self> {
        self.proxy.delete_all(self.owner).await?;
        Ok(self)
    }

    pub async fn reload(&mut self) -> ModelResult<()> {
        self.proxy.reload(self.owner).await
    }

    // --- edits through reassignment ---

    /// Edit a copy of the merged view and assign the result back.
    ///
    /// Records are regrouped by member, so the stored order follows declared
    /// member order rather than the edited order.
    pub async fn edit<T, F>(&mut self, f: F) -> ModelResult<T>
    where
        F: FnOnce(&mut Vec<R>) -> T,
    {
        self.proxy.edit(self.owner, "edit", f).await
    }

    pub async fn reverse(&mut self) -> ModelResult<()> {
        self.proxy.edit(self.owner, "reverse", |records| records.reverse()).await
    }

    pub async fn sort_by<F>(&mut self, compare: F) -> ModelResult<()>
    where
        F: FnMut(&R, &R) -> std::cmp::Ordering,
    {
        self.proxy.edit(self.owner, "sort_by", |records| records.sort_by(compare)).await
    }

    pub async fn retain<F>(&mut self, keep: F) -> ModelResult<()>
    where
        F: FnMut(&R) -> bool,
    {
        self.proxy.edit(self.owner, "retain", |records| records.retain(keep)).await
    }

    pub async fn dedup(&mut self) -> ModelResult<()> {
        self.proxy.edit(self.owner, "dedup", |records| records.dedup()).await
    }

    pub async fn rotate_left(&mut self, mid: usize) -> ModelResult<()> {
        self.proxy
            .edit(self.owner, "rotate_left", |records| {
                if !records.is_empty() {
                    let mid = mid % records.len();
                    records.rotate_left(mid);
                }
            })
            .await
    }

    pub async fn truncate(&mut self, len: usize) -> ModelResult<()> {
        self.proxy.edit(self.owner, "truncate", |records| records.truncate(len)).await
    }

    /// Remove and return the last record of the merged view
    pub async fn pop(&mut self) -> ModelResult<Option<R>> {
        self.proxy.edit(self.owner, "pop", |records| records.pop()).await
    }

    // --- operations that are ambiguous across member types ---

    pub fn find(&self, _key: &str) -> ModelResult<R> {
        self.proxy.unsupported("find")
    }

    pub fn create(&mut self, _record: R) -> ModelResult<R> {
        self.proxy.unsupported("create")
    }

    pub fn build(&mut self) -> ModelResult<R> {
        self.proxy.unsupported("build")
    }

    pub fn concat(&mut self, _records: Vec<R>) -> ModelResult<()> {
        self.proxy.unsupported("concat")
    }
}
