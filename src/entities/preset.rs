//! Reusable shift templates owned by a user.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::shift::{self, Shift};
use super::{user, Attributes, EntityKind, ValidationError};
use crate::store::{Action, EntitySlice, Relation, Relations, RootState, SliceAction};
use crate::utils::datetime;

/// `belongsTo` the owning user.
pub const USER: &str = "user";

static RELATIONS: Relations = Relations {
    belongs_to: Some(Relation::new(EntityKind::User, USER, user::PRESETS)),
    has_many: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(with = "datetime::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "datetime::hhmm")]
    pub end: NaiveTime,
    #[serde(default, alias = "breakMinutes")]
    pub break_minutes: u32,
}

impl Preset {
    /// Apply the template to a concrete day.
    pub fn to_shift(&self, date: chrono::NaiveDate) -> Shift {
        Shift {
            date,
            start: self.start,
            end: self.end,
            break_minutes: self.break_minutes,
        }
    }
}

impl Attributes for Preset {
    const KIND: EntityKind = EntityKind::Preset;

    fn relations() -> &'static Relations {
        &RELATIONS
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        shift::validate_span(self.start, self.end, self.break_minutes)
    }

    fn slice(state: &RootState) -> &EntitySlice<Self> {
        &state.presets
    }

    fn slice_mut(state: &mut RootState) -> &mut EntitySlice<Self> {
        &mut state.presets
    }

    fn wrap(action: SliceAction<Self>) -> Action {
        Action::Presets(action)
    }
}
