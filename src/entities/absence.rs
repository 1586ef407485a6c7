//! Absences (vacation, sick leave, ...) recorded on a timesheet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{timesheet, Attributes, EntityKind, ValidationError};
use crate::store::{Action, EntitySlice, Relation, Relations, RootState, SliceAction};

/// `belongsTo` the timesheet the absence is recorded on.
pub const TIMESHEET: &str = "timesheet";

static RELATIONS: Relations = Relations {
    belongs_to: Some(Relation::new(EntityKind::Timesheet, TIMESHEET, timesheet::ABSENCES)),
    has_many: &[],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceKind {
    Vacation,
    Sick,
    Holiday,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Absence {
    pub date: NaiveDate,
    pub kind: AbsenceKind,
    pub hours: f64,
}

impl Attributes for Absence {
    const KIND: EntityKind = EntityKind::Absence;

    fn relations() -> &'static Relations {
        &RELATIONS
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.hours > 0.0 && self.hours <= 24.0) {
            return Err(ValidationError::new("hours", format!("{} is outside (0, 24]", self.hours)));
        }
        Ok(())
    }

    fn slice(state: &RootState) -> &EntitySlice<Self> {
        &state.absences
    }

    fn slice_mut(state: &mut RootState) -> &mut EntitySlice<Self> {
        &mut state.absences
    }

    fn wrap(action: SliceAction<Self>) -> Action {
        Action::Absences(action)
    }
}
