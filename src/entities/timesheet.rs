//! Weekly timesheets submitted by employees.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{absence, shift, user, Attributes, EntityKind, ValidationError};
use crate::store::{Action, EntitySlice, Relation, Relations, RootState, SliceAction};
use crate::utils::datetime;

/// `belongsTo` the owning user.
pub const USER: &str = "user";
/// `hasMany` shifts worked during the week.
pub const SHIFTS: &str = "shifts";
/// `hasMany` absences during the week.
pub const ABSENCES: &str = "absences";

static RELATIONS: Relations = Relations {
    belongs_to: Some(Relation::new(EntityKind::User, USER, user::TIMESHEETS)),
    has_many: &[
        Relation::new(EntityKind::Shift, SHIFTS, shift::TIMESHEET),
        Relation::new(EntityKind::Absence, ABSENCES, absence::TIMESHEET),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimesheetStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timesheet {
    #[serde(alias = "weekStart")]
    pub week_start: NaiveDate,
    #[serde(default)]
    pub status: TimesheetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Timesheet {
    /// A draft timesheet for the week containing `date`.
    pub fn for_week_of(date: NaiveDate) -> Self {
        Self {
            week_start: datetime::week_start(date),
            status: TimesheetStatus::Draft,
            notes: None,
        }
    }

    /// Only drafts and rejected sheets may still be changed by the employee.
    pub fn is_editable(&self) -> bool {
        matches!(self.status, TimesheetStatus::Draft | TimesheetStatus::Rejected)
    }
}

impl Attributes for Timesheet {
    const KIND: EntityKind = EntityKind::Timesheet;

    fn relations() -> &'static Relations {
        &RELATIONS
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !datetime::is_week_start(self.week_start) {
            return Err(ValidationError::new(
                "week_start",
                format!("{} is not a Monday", datetime::format_ymd(self.week_start)),
            ));
        }
        Ok(())
    }

    fn slice(state: &RootState) -> &EntitySlice<Self> {
        &state.timesheets
    }

    fn slice_mut(state: &mut RootState) -> &mut EntitySlice<Self> {
        &mut state.timesheets
    }

    fn wrap(action: SliceAction<Self>) -> Action {
        Action::Timesheets(action)
    }
}
