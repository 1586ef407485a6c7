//! Read-only views over the root state.
//!
//! Every selector is total: unresolved or dangling IDs come back as `None`
//! or are skipped in lists, never as an error.

use serde_json::Value;

use super::{RootState, Status};
use crate::entities::{
    absence, shift, timesheet, user, Absence, Attributes, Entity, EntityId, Preset, Setting, Shift, Timesheet, User,
};

/// What the UI layer sees of one kind.
#[derive(Debug)]
pub struct EntityView<'a, A> {
    pub items: Vec<&'a Entity<A>>,
    pub status: Status,
    pub error: Option<&'a str>,
}

impl<A> EntityView<'_, A> {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Idle | Status::Pending)
    }
}

pub fn select<A: Attributes>(state: &RootState) -> EntityView<'_, A> {
    let slice = A::slice(state);
    EntityView {
        items: slice.iter().collect(),
        status: slice.status(),
        error: slice.error(),
    }
}

pub fn select_users(state: &RootState) -> EntityView<'_, User> {
    select(state)
}

pub fn select_timesheets(state: &RootState) -> EntityView<'_, Timesheet> {
    select(state)
}

pub fn select_shifts(state: &RootState) -> EntityView<'_, Shift> {
    select(state)
}

pub fn select_absences(state: &RootState) -> EntityView<'_, Absence> {
    select(state)
}

pub fn select_presets(state: &RootState) -> EntityView<'_, Preset> {
    select(state)
}

pub fn select_settings(state: &RootState) -> EntityView<'_, Setting> {
    select(state)
}

/// Look up one entity; `None` when absent or not loaded yet.
pub fn resolve<'a, A: Attributes>(state: &'a RootState, id: &EntityId) -> Option<&'a Entity<A>> {
    state.get(id)
}

/// Children of `parent` through its `hasMany` relation `name`, in list
/// order. Empty when `name` is not a `hasMany` of `P` targeting `C`.
pub fn children<'a, P: Attributes, C: Attributes>(
    state: &'a RootState,
    parent: &Entity<P>,
    name: &str,
) -> Vec<&'a Entity<C>> {
    if P::relations().has_many_to(name, C::KIND).is_none() {
        return Vec::new();
    }
    parent
        .child_ids(name)
        .iter()
        .filter_map(|id| resolve::<C>(state, id))
        .collect()
}

/// Parent of `child` through its `belongsTo` relation `name`.
pub fn parent<'a, C: Attributes, P: Attributes>(
    state: &'a RootState,
    child: &Entity<C>,
    name: &str,
) -> Option<&'a Entity<P>> {
    let relation = C::relations().belongs_to.filter(|relation| relation.foreign_key == name)?;
    if relation.target != P::KIND {
        return None;
    }
    resolve::<P>(state, child.parent_id(name)?)
}

pub fn timesheets_for_user<'a>(state: &'a RootState, user_id: &EntityId) -> Vec<&'a Entity<Timesheet>> {
    match resolve::<User>(state, user_id) {
        Some(user) => children::<User, Timesheet>(state, user, user::TIMESHEETS),
        None => Vec::new(),
    }
}

pub fn presets_for_user<'a>(state: &'a RootState, user_id: &EntityId) -> Vec<&'a Entity<Preset>> {
    match resolve::<User>(state, user_id) {
        Some(user) => children::<User, Preset>(state, user, user::PRESETS),
        None => Vec::new(),
    }
}

pub fn shifts_for_timesheet<'a>(state: &'a RootState, timesheet_id: &EntityId) -> Vec<&'a Entity<Shift>> {
    match resolve::<Timesheet>(state, timesheet_id) {
        Some(sheet) => children::<Timesheet, Shift>(state, sheet, timesheet::SHIFTS),
        None => Vec::new(),
    }
}

pub fn absences_for_timesheet<'a>(state: &'a RootState, timesheet_id: &EntityId) -> Vec<&'a Entity<Absence>> {
    match resolve::<Timesheet>(state, timesheet_id) {
        Some(sheet) => children::<Timesheet, Absence>(state, sheet, timesheet::ABSENCES),
        None => Vec::new(),
    }
}

pub fn timesheet_owner<'a>(state: &'a RootState, sheet: &Entity<Timesheet>) -> Option<&'a Entity<User>> {
    parent::<Timesheet, User>(state, sheet, timesheet::USER)
}

pub fn shift_timesheet<'a>(state: &'a RootState, entry: &Entity<Shift>) -> Option<&'a Entity<Timesheet>> {
    parent::<Shift, Timesheet>(state, entry, shift::TIMESHEET)
}

pub fn absence_timesheet<'a>(state: &'a RootState, entry: &Entity<Absence>) -> Option<&'a Entity<Timesheet>> {
    parent::<Absence, Timesheet>(state, entry, absence::TIMESHEET)
}

/// Worked plus absent hours on a timesheet; `None` when the sheet is not loaded.
pub fn timesheet_hours(state: &RootState, timesheet_id: &EntityId) -> Option<f64> {
    resolve::<Timesheet>(state, timesheet_id)?;
    let worked: f64 = shifts_for_timesheet(state, timesheet_id)
        .iter()
        .map(|entry| entry.attributes.worked_hours())
        .sum();
    let absent: f64 = absences_for_timesheet(state, timesheet_id)
        .iter()
        .map(|entry| entry.attributes.hours)
        .sum();
    Some(worked + absent)
}

pub fn find_user_by_email<'a>(state: &'a RootState, email: &str) -> Option<&'a Entity<User>> {
    state
        .slice::<User>()
        .iter()
        .find(|entry| entry.attributes.email.eq_ignore_ascii_case(email))
}

pub fn setting_value<'a>(state: &'a RootState, key: &str) -> Option<&'a Value> {
    state
        .slice::<Setting>()
        .iter()
        .find(|entry| entry.attributes.key == key)
        .map(|entry| &entry.attributes.value)
}
