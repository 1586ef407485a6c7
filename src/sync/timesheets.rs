use chrono::NaiveDate;

use crate::entities::{shift, Entity, EntityId, Preset, Shift, Timesheet, TimesheetStatus, ValidationError};
use crate::sync::{SyncError, SyncService};
use crate::utils::datetime;

impl SyncService {
    /// Hands an editable timesheet in for approval.
    pub async fn submit_timesheet(&self, id: &EntityId) -> Result<(), SyncError> {
        let sheet = self.read(|state| state.require::<Timesheet>(id).cloned()).await?;
        if !sheet.attributes.is_editable() {
            let message = format!("{:?} timesheets cannot be submitted", sheet.attributes.status);
            return Err(ValidationError::new("status", message).into());
        }
        self.transition(sheet, TimesheetStatus::Submitted).await
    }

    /// Administrator decision on a submitted timesheet.
    pub async fn review_timesheet(&self, id: &EntityId, approve: bool) -> Result<(), SyncError> {
        let sheet = self.read(|state| state.require::<Timesheet>(id).cloned()).await?;
        if sheet.attributes.status != TimesheetStatus::Submitted {
            return Err(ValidationError::new("status", "only submitted timesheets can be reviewed").into());
        }
        let status = if approve { TimesheetStatus::Approved } else { TimesheetStatus::Rejected };
        self.transition(sheet, status).await
    }

    async fn transition(&self, mut sheet: Entity<Timesheet>, status: TimesheetStatus) -> Result<(), SyncError> {
        sheet.attributes.status = status;
        self.update_entity(sheet).await
    }

    /// Records a shift built from one of the user's presets on `date`.
    ///
    /// `date` has to fall inside the timesheet's week and the sheet has to be
    /// editable.
    pub async fn add_shift_from_preset(
        &self,
        timesheet_id: &EntityId,
        preset_id: &EntityId,
        date: NaiveDate,
    ) -> Result<EntityId, SyncError> {
        let (sheet, template) = self
            .read(|state| {
                let sheet = state.require::<Timesheet>(timesheet_id)?.attributes.clone();
                let template = state.require::<Preset>(preset_id)?.clone();
                Ok::<_, SyncError>((sheet, template))
            })
            .await?;

        if !sheet.is_editable() {
            return Err(ValidationError::new("timesheet", "timesheet is no longer editable").into());
        }
        if !datetime::in_week(date, sheet.week_start) {
            return Err(ValidationError::new(
                "date",
                format!(
                    "{} is outside the week of {}",
                    datetime::format_ymd(date),
                    datetime::format_ymd(sheet.week_start)
                ),
            )
            .into());
        }

        let entry: Entity<Shift> =
            Entity::draft(template.attributes.to_shift(date)).with_parent(shift::TIMESHEET, timesheet_id.clone());
        self.create(entry).await
    }
}
