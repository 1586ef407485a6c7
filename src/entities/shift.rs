//! Worked shifts recorded on a timesheet.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{timesheet, Attributes, EntityKind, ValidationError};
use crate::store::{Action, EntitySlice, Relation, Relations, RootState, SliceAction};
use crate::utils::datetime;

/// `belongsTo` the timesheet the shift is recorded on.
pub const TIMESHEET: &str = "timesheet";

static RELATIONS: Relations = Relations {
    belongs_to: Some(Relation::new(EntityKind::Timesheet, TIMESHEET, timesheet::SHIFTS)),
    has_many: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub date: NaiveDate,
    #[serde(with = "datetime::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "datetime::hhmm")]
    pub end: NaiveTime,
    #[serde(default, alias = "breakMinutes")]
    pub break_minutes: u32,
}

impl Shift {
    /// Worked minutes, break deducted. Zero for an inverted shift.
    pub fn worked_minutes(&self) -> i64 {
        (datetime::minutes_between(self.start, self.end) - self.break_minutes as i64).max(0)
    }

    pub fn worked_hours(&self) -> f64 {
        self.worked_minutes() as f64 / 60.0
    }
}

/// Shared by shifts and presets.
pub(crate) fn validate_span(start: NaiveTime, end: NaiveTime, break_minutes: u32) -> Result<(), ValidationError> {
    let span = datetime::minutes_between(start, end);
    if span <= 0 {
        return Err(ValidationError::new(
            "end",
            format!("{} is not after {}", datetime::format_hm(end), datetime::format_hm(start)),
        ));
    }
    if break_minutes as i64 >= span {
        return Err(ValidationError::new(
            "break_minutes",
            format!("{break_minutes} minutes break exceeds a {span} minute shift"),
        ));
    }
    Ok(())
}

impl Attributes for Shift {
    const KIND: EntityKind = EntityKind::Shift;

    fn relations() -> &'static Relations {
        &RELATIONS
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_span(self.start, self.end, self.break_minutes)
    }

    fn slice(state: &RootState) -> &EntitySlice<Self> {
        &state.shifts
    }

    fn slice_mut(state: &mut RootState) -> &mut EntitySlice<Self> {
        &mut state.shifts
    }

    fn wrap(action: SliceAction<Self>) -> Action {
        Action::Shifts(action)
    }
}
