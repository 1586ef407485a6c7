//! Normalized client-side entity store.
//!
//! One [`EntitySlice`] per entity kind, composed into a [`RootState`]. All
//! mutations go through [`RootStore::dispatch`], which applies the slice
//! change and then rewrites back-references on every affected slice. The
//! slices themselves never look at each other; the root store is the only
//! writer of relationships across kinds.
//!
//! References are eventually consistent: an entity may point at an ID whose
//! collection has not been loaded yet. Selectors resolve such IDs to `None`
//! and skip them in lists.

pub mod action;
pub mod relations;
pub mod selectors;
pub mod slice;
pub mod state;

pub use action::{Action, SliceAction};
pub use relations::{Cardinality, LinkTable, Relation, Relations, Schema, SCHEMA};
pub use slice::{EntitySlice, ExtractFn};
pub use state::{EntityState, Status};

use log::debug;
use std::collections::HashSet;

use crate::constants::LOG_STORE_CLEARED;
use crate::entities::{
    Absence, Attributes, Entity, EntityId, EntityKind, Link, Preset, Relationships, Setting, Shift, Timesheet, User,
};

/// Store-level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("ID '{0}' is already taken")]
    DuplicateId(EntityId),
}

/// The keyed state tree: one slice per entity kind.
pub struct RootState {
    pub(crate) users: EntitySlice<User>,
    pub(crate) timesheets: EntitySlice<Timesheet>,
    pub(crate) shifts: EntitySlice<Shift>,
    pub(crate) absences: EntitySlice<Absence>,
    pub(crate) presets: EntitySlice<Preset>,
    pub(crate) settings: EntitySlice<Setting>,
}

impl Default for RootState {
    fn default() -> Self {
        Self {
            users: EntitySlice::for_attributes(),
            timesheets: EntitySlice::for_attributes(),
            shifts: EntitySlice::for_attributes(),
            absences: EntitySlice::for_attributes(),
            presets: EntitySlice::for_attributes(),
            settings: EntitySlice::for_attributes(),
        }
    }
}

impl RootState {
    pub fn slice<A: Attributes>(&self) -> &EntitySlice<A> {
        A::slice(self)
    }

    pub fn get<A: Attributes>(&self, id: &EntityId) -> Option<&Entity<A>> {
        A::slice(self).get(id)
    }

    /// Like [`RootState::get`], for callers that need the entity to exist.
    pub fn require<A: Attributes>(&self, id: &EntityId) -> Result<&Entity<A>, StoreError> {
        self.get(id).ok_or_else(|| StoreError::NotFound {
            kind: A::KIND,
            id: id.clone(),
        })
    }

    pub fn status(&self, kind: EntityKind) -> Status {
        match kind {
            EntityKind::User => self.users.status(),
            EntityKind::Timesheet => self.timesheets.status(),
            EntityKind::Shift => self.shifts.status(),
            EntityKind::Absence => self.absences.status(),
            EntityKind::Preset => self.presets.status(),
            EntityKind::Setting => self.settings.status(),
        }
    }

    pub fn generation(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::User => self.users.generation(),
            EntityKind::Timesheet => self.timesheets.generation(),
            EntityKind::Shift => self.shifts.generation(),
            EntityKind::Absence => self.absences.generation(),
            EntityKind::Preset => self.presets.generation(),
            EntityKind::Setting => self.settings.generation(),
        }
    }

    pub fn table(&self, kind: EntityKind) -> &dyn LinkTable {
        match kind {
            EntityKind::User => self.users.state(),
            EntityKind::Timesheet => self.timesheets.state(),
            EntityKind::Shift => self.shifts.state(),
            EntityKind::Absence => self.absences.state(),
            EntityKind::Preset => self.presets.state(),
            EntityKind::Setting => self.settings.state(),
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut dyn LinkTable {
        match kind {
            EntityKind::User => self.users.state_mut(),
            EntityKind::Timesheet => self.timesheets.state_mut(),
            EntityKind::Shift => self.shifts.state_mut(),
            EntityKind::Absence => self.absences.state_mut(),
            EntityKind::Preset => self.presets.state_mut(),
            EntityKind::Setting => self.settings.state_mut(),
        }
    }

    fn link_ids(&self, kind: EntityKind, id: &EntityId, name: &str) -> Vec<EntityId> {
        self.table(kind)
            .link(id, name)
            .map(|link| link.ids().to_vec())
            .unwrap_or_default()
    }
}

/// Owns the state tree and serializes every mutation through `dispatch`.
#[derive(Default)]
pub struct RootStore {
    state: RootState,
}

impl RootStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    pub fn dispatch(&mut self, action: impl Into<Action>) -> Result<(), StoreError> {
        match action.into() {
            Action::Users(action) => self.apply(action),
            Action::Timesheets(action) => self.apply(action),
            Action::Shifts(action) => self.apply(action),
            Action::Absences(action) => self.apply(action),
            Action::Presets(action) => self.apply(action),
            Action::Settings(action) => self.apply(action),
            Action::ClearAll => {
                for kind in EntityKind::ALL {
                    self.clear_kind(kind);
                }
                debug!("{LOG_STORE_CLEARED}");
                Ok(())
            }
        }
    }

    fn apply<A: Attributes>(&mut self, action: SliceAction<A>) -> Result<(), StoreError> {
        let kind = A::KIND;
        match action {
            SliceAction::Set(entities) => {
                let incoming: HashSet<&EntityId> = entities.iter().map(|entity| &entity.id).collect();
                let stale: Vec<EntityId> = A::slice(&self.state)
                    .all_ids()
                    .iter()
                    .filter(|id| !incoming.contains(id))
                    .cloned()
                    .collect();
                for id in &stale {
                    self.strip_references(kind, id);
                }

                let writes: Vec<(EntityId, Vec<&'static str>, Option<Relationships>)> = entities
                    .iter()
                    .map(|entity| {
                        let previous = A::slice(&self.state).get(&entity.id).map(|e| e.relationships.clone());
                        (entity.id.clone(), entity.relationships.keys().copied().collect(), previous)
                    })
                    .collect();

                debug!("{kind}: set {} entities, dropped {}", writes.len(), stale.len());
                A::slice_mut(&mut self.state).state_mut().replace_all(entities);
                for (id, carried, previous) in writes {
                    self.link(kind, &id, &carried, previous.as_ref());
                }
            }
            SliceAction::Upsert(entity) => self.upsert(entity),
            SliceAction::UpsertMany(entities) => {
                for entity in entities {
                    self.upsert(entity);
                }
            }
            SliceAction::Remove(id) => {
                let removed = A::slice_mut(&mut self.state).state_mut().remove(&id);
                let stripped = self.strip_references(kind, &id);
                debug!(
                    "{kind}: remove '{id}' (present: {}, references stripped: {stripped})",
                    removed.is_some()
                );
            }
            SliceAction::Commit { provisional, entity } => {
                let persisted = entity.id.clone();
                A::slice_mut(&mut self.state)
                    .state_mut()
                    .rename(kind, &provisional, &persisted)?;
                for (owner, relation) in SCHEMA.referencing(kind) {
                    self.state
                        .table_mut(owner)
                        .rename_all(relation.foreign_key, &provisional, &persisted);
                }
                debug!("{kind}: committed '{provisional}' as '{persisted}'");
                self.upsert(entity);
            }
            SliceAction::Clear => self.clear_kind(kind),
            SliceAction::SetPending => A::slice_mut(&mut self.state).state_mut().set_pending(),
            SliceAction::SetError(message) => A::slice_mut(&mut self.state).state_mut().set_error(message),
        }
        Ok(())
    }

    fn upsert<A: Attributes>(&mut self, entity: Entity<A>) {
        let id = entity.id.clone();
        let carried: Vec<&'static str> = entity.relationships.keys().copied().collect();
        let previous = A::slice_mut(&mut self.state).state_mut().upsert(entity);
        debug!("{}: upsert '{id}' (new: {})", A::KIND, previous.is_none());
        self.link(A::KIND, &id, &carried, previous.as_ref());
    }

    fn clear_kind(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::User => self.state.users.state_mut().clear(),
            EntityKind::Timesheet => self.state.timesheets.state_mut().clear(),
            EntityKind::Shift => self.state.shifts.state_mut().clear(),
            EntityKind::Absence => self.state.absences.state_mut().clear(),
            EntityKind::Preset => self.state.presets.state_mut().clear(),
            EntityKind::Setting => self.state.settings.state_mut().clear(),
        }
    }

    /// Remove `id` from every relationship, of any kind, that targets `kind`.
    fn strip_references(&mut self, kind: EntityKind, id: &EntityId) -> usize {
        SCHEMA
            .referencing(kind)
            .into_iter()
            .map(|(owner, relation)| self.state.table_mut(owner).strip_all(relation.foreign_key, id))
            .sum()
    }

    /// Re-establish back-references after entity `id` of `kind` was written.
    ///
    /// `carried` names the links present in the written entity and
    /// `previous` holds the stored links before the write (`None` for a
    /// fresh insert).
    fn link(&mut self, kind: EntityKind, id: &EntityId, carried: &[&'static str], previous: Option<&Relationships>) {
        let relations = SCHEMA.relations(kind);

        if let Some(relation) = relations.belongs_to {
            let parent = self.state.table(kind).link(id, relation.foreign_key).and_then(|link| match link {
                Link::One(parent) => parent.clone(),
                Link::Many(_) => None,
            });
            let holders = self
                .state
                .table(relation.target)
                .ids_where(relation.back_populates, &|link: &Link| link.contains(id));
            let target = self.state.table_mut(relation.target);
            for holder in holders.iter().filter(|holder| Some(*holder) != parent.as_ref()) {
                target.detach(holder, relation.back_populates, id);
            }
            if let Some(parent) = &parent {
                target.attach(parent, relation.back_populates, id);
            }
        }

        for relation in relations.has_many {
            let authoritative = previous.is_some() && carried.contains(&relation.foreign_key);
            let listed = self.state.link_ids(kind, id, relation.foreign_key);

            let pointing = self
                .state
                .table(relation.target)
                .ids_where(relation.back_populates, &|link: &Link| link.contains(id));
            let unlisted: Vec<EntityId> = pointing.into_iter().filter(|child| !listed.contains(child)).collect();
            if authoritative {
                let target = self.state.table_mut(relation.target);
                for child in &unlisted {
                    target.set_link(child, relation.back_populates, Link::One(None));
                }
            } else {
                let table = self.state.table_mut(kind);
                for child in &unlisted {
                    table.attach(id, relation.foreign_key, child);
                }
            }

            for child in &listed {
                let target = self.state.table(relation.target);
                if !target.contains(child) {
                    continue;
                }
                let old_parent = target.link(child, relation.back_populates).and_then(|link| match link {
                    Link::One(parent) => parent.clone(),
                    Link::Many(_) => None,
                });
                if old_parent.as_ref() == Some(id) {
                    continue;
                }
                if let Some(old_parent) = old_parent {
                    self.state.table_mut(kind).detach(&old_parent, relation.foreign_key, child);
                }
                self.state
                    .table_mut(relation.target)
                    .set_link(child, relation.back_populates, Link::One(Some(id.clone())));
            }
        }
    }
}
