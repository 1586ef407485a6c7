//! Per-kind normalized state container.

use std::collections::HashMap;

use super::relations::LinkTable;
use super::StoreError;
use crate::entities::{Entity, EntityId, EntityKind, Link, Relationships};

/// Load status of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing requested yet, or cleared
    #[default]
    Idle,
    /// A fetch is in flight
    Pending,
    /// The last fetch succeeded
    Ready,
    /// The last fetch failed; see [`EntityState::error`]
    Error,
}

/// Normalized records of one kind: `by_id` for lookup, `all_ids` for order.
///
/// This type knows nothing about other kinds. Back-references across kinds
/// are written by the root store.
#[derive(Debug, Clone)]
pub struct EntityState<A> {
    by_id: HashMap<EntityId, Entity<A>>,
    all_ids: Vec<EntityId>,
    status: Status,
    error: Option<String>,
    generation: u64,
}

impl<A> Default for EntityState<A> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            all_ids: Vec::new(),
            status: Status::Idle,
            error: None,
            generation: 0,
        }
    }
}

impl<A> EntityState<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(&self) -> &HashMap<EntityId, Entity<A>> {
        &self.by_id
    }

    pub fn all_ids(&self) -> &[EntityId] {
        &self.all_ids
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity<A>> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    /// Entities in `all_ids` order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity<A>> {
        self.all_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Last fetch error, present only in [`Status::Error`].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bumped by every [`EntityState::clear`]; lets in-flight fetches detect
    /// that the state they were started for is gone.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the whole collection in the given order and mark it ready.
    ///
    /// Links not carried by an incoming entity are kept from the stored one.
    pub(crate) fn replace_all(&mut self, entities: Vec<Entity<A>>) {
        let mut previous = std::mem::take(&mut self.by_id);
        self.all_ids.clear();
        for mut entity in entities {
            entity.normalize_links();
            if let Some(old) = previous.remove(&entity.id) {
                merge_links(&mut entity.relationships, old.relationships);
            }
            self.insert_or_merge(entity);
        }
        self.status = Status::Ready;
        self.error = None;
    }

    /// Insert, or shallow-merge into the existing record. Returns the
    /// previous relationships when the ID was already present.
    pub(crate) fn upsert(&mut self, mut entity: Entity<A>) -> Option<Relationships> {
        entity.normalize_links();
        self.insert_or_merge(entity)
    }

    fn insert_or_merge(&mut self, entity: Entity<A>) -> Option<Relationships> {
        match self.by_id.get_mut(&entity.id) {
            Some(existing) => {
                let previous = existing.relationships.clone();
                existing.attributes = entity.attributes;
                for (name, link) in entity.relationships {
                    existing.relationships.insert(name, link);
                }
                Some(previous)
            }
            None => {
                self.all_ids.push(entity.id.clone());
                self.by_id.insert(entity.id.clone(), entity);
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, id: &EntityId) -> Option<Entity<A>> {
        let removed = self.by_id.remove(id)?;
        self.all_ids.retain(|existing| existing != id);
        Some(removed)
    }

    /// Move the record stored under `from` to `to`, keeping its position.
    pub(crate) fn rename(&mut self, kind: EntityKind, from: &EntityId, to: &EntityId) -> Result<(), StoreError> {
        if from == to {
            return Ok(());
        }
        if self.by_id.contains_key(to) {
            return Err(StoreError::DuplicateId(to.clone()));
        }
        let mut entity = self.by_id.remove(from).ok_or_else(|| StoreError::NotFound {
            kind,
            id: from.clone(),
        })?;
        entity.id = to.clone();
        self.by_id.insert(to.clone(), entity);
        for id in self.all_ids.iter_mut().filter(|id| *id == from) {
            *id = to.clone();
        }
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.by_id.clear();
        self.all_ids.clear();
        self.status = Status::Idle;
        self.error = None;
        self.generation += 1;
    }

    pub(crate) fn set_pending(&mut self) {
        self.status = Status::Pending;
        self.error = None;
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.status = Status::Error;
        self.error = Some(message.into());
    }
}

fn merge_links(incoming: &mut Relationships, stored: Relationships) {
    for (name, link) in stored {
        incoming.entry(name).or_insert(link);
    }
}

impl<A> LinkTable for EntityState<A> {
    fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    fn link(&self, id: &EntityId, name: &str) -> Option<&Link> {
        self.by_id.get(id)?.relationships.get(name)
    }

    fn set_link(&mut self, id: &EntityId, name: &'static str, link: Link) -> bool {
        match self.by_id.get_mut(id) {
            Some(entity) => {
                entity.relationships.insert(name, link);
                true
            }
            None => false,
        }
    }

    fn ids_where(&self, name: &str, pred: &dyn Fn(&Link) -> bool) -> Vec<EntityId> {
        self.iter()
            .filter(|entity| entity.relationships.get(name).is_some_and(pred))
            .map(|entity| entity.id.clone())
            .collect()
    }

    fn strip_all(&mut self, name: &str, id: &EntityId) -> usize {
        self.by_id
            .values_mut()
            .filter_map(|entity| entity.relationships.get_mut(name))
            .map(|link| link.strip(id))
            .filter(|changed| *changed)
            .count()
    }

    fn rename_all(&mut self, name: &str, from: &EntityId, to: &EntityId) {
        for link in self.by_id.values_mut().filter_map(|entity| entity.relationships.get_mut(name)) {
            link.rename(from, to);
        }
    }
}
