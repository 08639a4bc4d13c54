//! Union Registry - declaration-time validation and the per-model schema
//!
//! Relations and unions are collected in a `SchemaBuilder` while a model type
//! is set up. `build` freezes them into an `EntitySchema` that is only read
//! from afterwards.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ModelError, ModelResult, UnionError};
use crate::model::{Model, Morph};
use crate::relationships::{
    CollectionRelation, Member, RelationshipMetadata, SingleRelation,
};

use super::config::UnionOptions;
use super::definition::{UnionDefinition, UnionMembers};

/// A declared relation with its record type erased
struct RelationEntry {
    metadata: RelationshipMetadata,
    /// Holds a `Member<Owner, Related>`
    member: Arc<dyn Any + Send + Sync>,
}

/// A declared union with its record type erased
struct UnionEntry {
    metadata: RelationshipMetadata,
    /// Holds a `UnionDefinition<Owner, Related>`
    definition: Arc<dyn Any + Send + Sync>,
}

/// Collects relations and unions for one model type
pub struct SchemaBuilder<E: Model> {
    attributes: HashSet<String>,
    relations: HashMap<String, RelationEntry>,
    unions: HashMap<String, UnionEntry>,
    _model: PhantomData<fn() -> E>,
}

impl<E: Model> Default for SchemaBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Model> SchemaBuilder<E> {
    pub fn new() -> Self {
        Self {
            attributes: HashSet::new(),
            relations: HashMap::new(),
            unions: HashMap::new(),
            _model: PhantomData,
        }
    }

    /// Declare a plain attribute name so unions cannot shadow it
    pub fn attribute(&mut self, name: &str) -> ModelResult<&mut Self> {
        self.ensure_name_free(name)?;
        self.attributes.insert(name.to_string());
        Ok(self)
    }

    /// Register a has-many relation
    pub fn has_many<R, C>(&mut self, relation: Arc<C>) -> ModelResult<&mut Self>
    where
        R: Morph,
        C: CollectionRelation<E, R> + 'static,
    {
        let relation: Arc<dyn CollectionRelation<E, R>> = relation;
        self.register_member(Member::Collection(relation))
    }

    /// Register a has-one relation
    pub fn has_one<R, S>(&mut self, relation: Arc<S>) -> ModelResult<&mut Self>
    where
        R: Morph,
        S: SingleRelation<E, R> + 'static,
    {
        let relation: Arc<dyn SingleRelation<E, R>> = relation;
        self.register_member(Member::Single(relation))
    }

    fn register_member<R: Morph>(&mut self, member: Member<E, R>) -> ModelResult<&mut Self> {
        let name = member.name().to_string();
        self.ensure_name_free(&name)?;

        debug!("Registering {:?} relation '{}' on {}", member.cardinality(), name, E::table_name());
        self.relations.insert(
            name,
            RelationEntry {
                metadata: member.metadata(),
                member: Arc::new(member),
            },
        );
        Ok(self)
    }

    /// Declare a union relation named `name` over `members`.
    ///
    /// Fails with `NameConflict`, `EmptyUnion`, `UnknownMember`,
    /// `IncompatibleMember` or `MixedCardinality`; any of these means the
    /// model's schema is broken and setup should abort.
    pub fn declare_union<R: Morph>(
        &mut self,
        name: &str,
        members: &[&str],
        options: UnionOptions,
    ) -> ModelResult<&mut Self> {
        self.ensure_name_free(name)?;

        if members.is_empty() {
            return Err(UnionError::EmptyUnion {
                union: name.to_string(),
            }
            .into());
        }

        let mut resolved: Vec<Member<E, R>> = Vec::with_capacity(members.len());
        for member_name in members {
            let entry = self.relations.get(*member_name).ok_or_else(|| {
                UnionError::UnknownMember {
                    union: name.to_string(),
                    member: member_name.to_string(),
                }
            })?;
            let member = entry
                .member
                .downcast_ref::<Member<E, R>>()
                .ok_or_else(|| UnionError::IncompatibleMember {
                    union: name.to_string(),
                    member: member_name.to_string(),
                })?;
            resolved.push(member.clone());
        }

        let member_names: Vec<String> = members.iter().map(|m| m.to_string()).collect();
        let related_types = resolved.iter().map(Member::related_type).collect();
        let union_members = collect_members(name, resolved)?;

        let definition = UnionDefinition::new(
            name.to_string(),
            member_names,
            related_types,
            union_members,
            options,
        );
        let metadata = definition.reflection();

        debug!(
            "Declared {:?} union '{}' on {} over {:?} (representative: {})",
            definition.cardinality(),
            name,
            E::table_name(),
            definition.member_names(),
            definition.representative()
        );

        self.unions.insert(
            name.to_string(),
            UnionEntry {
                metadata,
                definition: Arc::new(definition),
            },
        );
        Ok(self)
    }

    /// Freeze the declarations
    pub fn build(self) -> Arc<EntitySchema<E>> {
        Arc::new(EntitySchema {
            attributes: self.attributes,
            relations: self.relations,
            unions: self.unions,
            _model: PhantomData,
        })
    }

    fn ensure_name_free(&self, name: &str) -> ModelResult<()> {
        if self.attributes.contains(name)
            || self.relations.contains_key(name)
            || self.unions.contains_key(name)
        {
            return Err(UnionError::NameConflict {
                entity: E::table_name().to_string(),
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl<E: Model> std::fmt::Debug for SchemaBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("model", &E::table_name())
            .field("attributes", &self.attributes.len())
            .field("relations", &self.relations.len())
            .field("unions", &self.unions.len())
            .finish()
    }
}

/// Sort resolved members into one cardinality or reject the mix
fn collect_members<E, R>(
    union: &str,
    resolved: Vec<Member<E, R>>,
) -> ModelResult<UnionMembers<E, R>> {
    if resolved.iter().all(Member::is_collection) {
        let members = resolved
            .into_iter()
            .filter_map(|member| match member {
                Member::Collection(relation) => Some(relation),
                Member::Single(_) => None,
            })
            .collect();
        Ok(UnionMembers::Collection(members))
    } else if resolved.iter().all(|member| !member.is_collection()) {
        let members = resolved
            .into_iter()
            .filter_map(|member| match member {
                Member::Single(relation) => Some(relation),
                Member::Collection(_) => None,
            })
            .collect();
        Ok(UnionMembers::Single(members))
    } else {
        Err(UnionError::MixedCardinality {
            union: union.to_string(),
        }
        .into())
    }
}

/// Immutable relation and union declarations of one model type
pub struct EntitySchema<E: Model> {
    attributes: HashSet<String>,
    relations: HashMap<String, RelationEntry>,
    unions: HashMap<String, UnionEntry>,
    _model: PhantomData<fn() -> E>,
}

impl<E: Model> EntitySchema<E> {
    /// Start declaring a schema
    pub fn builder() -> SchemaBuilder<E> {
        SchemaBuilder::new()
    }

    /// Look up a union definition relating records of type `R`
    pub fn union_definition<R: Morph>(&self, name: &str) -> ModelResult<Arc<UnionDefinition<E, R>>> {
        let entry = self.unions.get(name).ok_or_else(|| UnionError::UnknownUnion {
            entity: E::table_name().to_string(),
            name: name.to_string(),
        })?;

        Arc::clone(&entry.definition)
            .downcast::<UnionDefinition<E, R>>()
            .map_err(|_| {
                ModelError::Configuration(format!(
                    "union '{}' on {} relates a different record type",
                    name,
                    E::table_name()
                ))
            })
    }

    /// Reflection metadata for a relation or union
    pub fn reflection(&self, name: &str) -> Option<&RelationshipMetadata> {
        self.unions
            .get(name)
            .map(|entry| &entry.metadata)
            .or_else(|| self.relations.get(name).map(|entry| &entry.metadata))
    }

    /// Look up a declared relation relating records of type `R`
    pub fn relation<R: Morph>(&self, name: &str) -> Option<Member<E, R>> {
        self.relations
            .get(name)?
            .member
            .downcast_ref::<Member<E, R>>()
            .cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn has_union(&self, name: &str) -> bool {
        self.unions.contains_key(name)
    }

    /// Union names, sorted
    pub fn union_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.unions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Relation names, sorted
    pub fn relation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.relations.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<E: Model> std::fmt::Debug for EntitySchema<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySchema")
            .field("model", &E::table_name())
            .field("relations", &self.relation_names())
            .field("unions", &self.union_names())
            .finish()
    }
}
