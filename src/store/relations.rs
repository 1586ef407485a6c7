//! Relationship descriptors and the global relationship graph.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::entities::{Absence, Attributes, EntityId, EntityKind, Link, Preset, Setting, Shift, Timesheet, User};

/// One declared association: the field on the declaring entity, the related
/// kind, and the field on the related entity that points back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub target: EntityKind,
    pub foreign_key: &'static str,
    pub back_populates: &'static str,
}

impl Relation {
    pub const fn new(target: EntityKind, foreign_key: &'static str, back_populates: &'static str) -> Self {
        Self {
            target,
            foreign_key,
            back_populates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    BelongsTo,
    HasMany,
}

/// All associations declared by one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct Relations {
    pub belongs_to: Option<Relation>,
    pub has_many: &'static [Relation],
}

impl Relations {
    pub const NONE: Relations = Relations {
        belongs_to: None,
        has_many: &[],
    };

    pub fn iter(&self) -> impl Iterator<Item = (Relation, Cardinality)> + '_ {
        self.belongs_to
            .iter()
            .map(|relation| (*relation, Cardinality::BelongsTo))
            .chain(self.has_many.iter().map(|relation| (*relation, Cardinality::HasMany)))
    }

    pub fn find(&self, name: &str) -> Option<(Relation, Cardinality)> {
        self.iter().find(|(relation, _)| relation.foreign_key == name)
    }

    /// The `hasMany` relation named `name`, if it targets `target`.
    pub fn has_many_to(&self, name: &str, target: EntityKind) -> Option<Relation> {
        self.has_many
            .iter()
            .find(|relation| relation.foreign_key == name && relation.target == target)
            .copied()
    }
}

/// The full relationship graph, indexed by kind.
pub struct Schema {
    by_kind: HashMap<EntityKind, &'static Relations>,
}

pub static SCHEMA: Lazy<Schema> = Lazy::new(Schema::build);

impl Schema {
    fn build() -> Self {
        let by_kind = HashMap::from([
            (EntityKind::User, User::relations()),
            (EntityKind::Timesheet, Timesheet::relations()),
            (EntityKind::Shift, Shift::relations()),
            (EntityKind::Absence, Absence::relations()),
            (EntityKind::Preset, Preset::relations()),
            (EntityKind::Setting, Setting::relations()),
        ]);
        Self { by_kind }
    }

    pub fn relations(&self, kind: EntityKind) -> &'static Relations {
        self.by_kind.get(&kind).copied().unwrap_or(&Relations::NONE)
    }

    /// Every `(owner kind, relation)` whose relation targets `kind`.
    pub fn referencing(&self, kind: EntityKind) -> Vec<(EntityKind, Relation)> {
        EntityKind::ALL
            .iter()
            .flat_map(|owner| {
                self.relations(*owner)
                    .iter()
                    .filter(move |(relation, _)| relation.target == kind)
                    .map(move |(relation, _)| (*owner, relation))
            })
            .collect()
    }

    /// Check that every relation has a matching inverse on its target.
    pub fn check(&self) -> Result<(), String> {
        for owner in EntityKind::ALL {
            for (relation, cardinality) in self.relations(owner).iter() {
                let inverse = self
                    .relations(relation.target)
                    .find(relation.back_populates)
                    .ok_or_else(|| {
                        format!(
                            "{owner}.{} has no inverse {}.{}",
                            relation.foreign_key, relation.target, relation.back_populates
                        )
                    })?;
                let (back, back_cardinality) = inverse;
                if back.target != owner || back.back_populates != relation.foreign_key {
                    return Err(format!(
                        "{owner}.{} and {}.{} do not point at each other",
                        relation.foreign_key, relation.target, relation.back_populates
                    ));
                }
                if back_cardinality == cardinality {
                    return Err(format!(
                        "{owner}.{} and its inverse have the same cardinality",
                        relation.foreign_key
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Type-erased access to the relationship side of one slice, so the root
/// store can maintain back-references across slices of different kinds.
pub trait LinkTable {
    fn contains(&self, id: &EntityId) -> bool;

    fn link(&self, id: &EntityId, name: &str) -> Option<&Link>;

    /// Overwrite a link. Returns false when the entity is not loaded.
    fn set_link(&mut self, id: &EntityId, name: &'static str, link: Link) -> bool;

    /// IDs whose `name` link satisfies `pred`, in insertion order.
    fn ids_where(&self, name: &str, pred: &dyn Fn(&Link) -> bool) -> Vec<EntityId>;

    /// Remove `id` from the `name` link of every entity.
    fn strip_all(&mut self, name: &str, id: &EntityId) -> usize;

    /// Rename `from` to `to` in the `name` link of every entity.
    fn rename_all(&mut self, name: &str, from: &EntityId, to: &EntityId);

    /// Append `child` to the `Many` link `name` of `parent`, once.
    fn attach(&mut self, parent: &EntityId, name: &'static str, child: &EntityId) -> bool {
        let mut link = match self.link(parent, name) {
            Some(link) => link.clone(),
            None if self.contains(parent) => Link::Many(Vec::new()),
            None => return false,
        };
        if link.push(child) {
            self.set_link(parent, name, link)
        } else {
            false
        }
    }

    /// Remove `child` from the `Many` link `name` of `parent`.
    fn detach(&mut self, parent: &EntityId, name: &'static str, child: &EntityId) -> bool {
        let Some(mut link) = self.link(parent, name).cloned() else {
            return false;
        };
        if link.strip(child) {
            self.set_link(parent, name, link)
        } else {
            false
        }
    }
}
