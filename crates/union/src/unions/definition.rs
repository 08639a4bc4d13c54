//! Union definition - the immutable result of declaring a union relation

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Morph, TypeTag};
use crate::relationships::{
    Cardinality, CollectionRelation, RelationshipMetadata, SingleRelation,
};

use super::config::UnionOptions;

/// Member relations of a union. Cardinality is carried by the variant, so a
/// definition cannot hold a mix.
pub enum UnionMembers<Owner, Related> {
    Collection(Vec<Arc<dyn CollectionRelation<Owner, Related>>>),
    Single(Vec<Arc<dyn SingleRelation<Owner, Related>>>),
}

impl<Owner, Related> UnionMembers<Owner, Related> {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            UnionMembers::Collection(_) => Cardinality::Collection,
            UnionMembers::Single(_) => Cardinality::Single,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            UnionMembers::Collection(members) => members.len(),
            UnionMembers::Single(members) => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A declared union relation
pub struct UnionDefinition<Owner, Related> {
    name: String,
    member_names: Vec<String>,
    members: UnionMembers<Owner, Related>,
    representative: usize,
    related_type: TypeTag,
    options: UnionOptions,
    /// Member type tag -> index of the first member declaring it
    dispatch: HashMap<TypeTag, usize>,
}

impl<Owner, Related> UnionDefinition<Owner, Related>
where
    Related: Morph,
{
    /// Build a definition from already validated parts.
    ///
    /// `related_types[i]` is the related type of member `i`.
    pub(crate) fn new(
        name: String,
        member_names: Vec<String>,
        related_types: Vec<TypeTag>,
        members: UnionMembers<Owner, Related>,
        options: UnionOptions,
    ) -> Self {
        let representative = options
            .default
            .as_ref()
            .and_then(|default| member_names.iter().position(|member| member == default))
            .unwrap_or(0);

        let mut dispatch = HashMap::new();
        for (index, tag) in related_types.iter().enumerate() {
            dispatch.entry(tag.clone()).or_insert(index);
        }

        Self {
            name,
            member_names,
            members,
            representative,
            related_type: related_types[representative].clone(),
            options,
            dispatch,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &UnionMembers<Owner, Related> {
        &self.members
    }

    /// Member relation names in declared order
    pub fn member_names(&self) -> &[String] {
        &self.member_names
    }

    pub fn cardinality(&self) -> Cardinality {
        self.members.cardinality()
    }

    /// Name of the member supplying reflection metadata
    pub fn representative(&self) -> &str {
        &self.member_names[self.representative]
    }

    pub fn options(&self) -> &UnionOptions {
        &self.options
    }

    /// Index of the member that owns `record`, if any.
    ///
    /// The owner is the earliest declared member whose related type appears
    /// anywhere in the record's lineage.
    pub fn detect_member_for(&self, record: &Related) -> Option<usize> {
        record
            .morph_lineage()
            .iter()
            .filter_map(|tag| self.dispatch.get(tag).copied())
            .min()
    }

    /// Split `records` by owning member, keeping input order within each
    /// member. Foreign records are dropped; their count is returned.
    pub fn partition(&self, records: Vec<Related>) -> (Vec<Vec<Related>>, usize) {
        let mut partitions: Vec<Vec<Related>> = vec![Vec::new(); self.member_names.len()];
        let mut foreign = 0;

        for record in records {
            match self.detect_member_for(&record) {
                Some(index) => partitions[index].push(record),
                None => foreign += 1,
            }
        }

        (partitions, foreign)
    }

    /// Reflection metadata for the union
    pub fn reflection(&self) -> RelationshipMetadata {
        RelationshipMetadata::new(
            self.cardinality().relationship_type(),
            self.name.clone(),
            self.related_type.clone(),
        )
        .with_members(self.member_names.clone())
        .with_representative(self.representative().to_string())
    }
}

impl<Owner, Related> std::fmt::Debug for UnionDefinition<Owner, Related> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionDefinition")
            .field("name", &self.name)
            .field("members", &self.member_names)
            .field("cardinality", &self.members.cardinality())
            .field("representative", &self.member_names[self.representative])
            .finish()
    }
}
