//! Store actions.

use crate::entities::{
    Absence, Attributes, Entity, EntityId, EntityKind, Preset, Setting, Shift, Timesheet, User,
};

/// A mutation of one kind's slice.
#[derive(Debug, Clone)]
pub enum SliceAction<A> {
    /// Replace the whole collection after a full fetch; marks it ready
    Set(Vec<Entity<A>>),
    Upsert(Entity<A>),
    UpsertMany(Vec<Entity<A>>),
    /// Delete and strip every reference to the ID
    Remove(EntityId),
    /// Swap a provisional ID for the backend's and merge the persisted record
    Commit { provisional: EntityId, entity: Entity<A> },
    /// Back to idle and empty
    Clear,
    SetPending,
    SetError(String),
}

/// Anything the root store can be asked to do.
#[derive(Debug, Clone)]
pub enum Action {
    Users(SliceAction<User>),
    Timesheets(SliceAction<Timesheet>),
    Shifts(SliceAction<Shift>),
    Absences(SliceAction<Absence>),
    Presets(SliceAction<Preset>),
    Settings(SliceAction<Setting>),
    /// Clear every slice, e.g. on logout
    ClearAll,
}

impl Action {
    pub fn of<A: Attributes>(action: SliceAction<A>) -> Self {
        A::wrap(action)
    }

    /// Kind addressed by the action, `None` for store-wide actions.
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Action::Users(_) => Some(EntityKind::User),
            Action::Timesheets(_) => Some(EntityKind::Timesheet),
            Action::Shifts(_) => Some(EntityKind::Shift),
            Action::Absences(_) => Some(EntityKind::Absence),
            Action::Presets(_) => Some(EntityKind::Preset),
            Action::Settings(_) => Some(EntityKind::Setting),
            Action::ClearAll => None,
        }
    }
}

impl<A: Attributes> From<SliceAction<A>> for Action {
    fn from(action: SliceAction<A>) -> Self {
        A::wrap(action)
    }
}
