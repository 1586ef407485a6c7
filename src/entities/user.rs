//! Employees and administrators.

use serde::{Deserialize, Serialize};

use super::{preset, timesheet, Attributes, EntityKind, ValidationError};
use crate::store::{Action, EntitySlice, Relation, Relations, RootState, SliceAction};

/// `hasMany` timesheets of the user.
pub const TIMESHEETS: &str = "timesheets";
/// `hasMany` shift presets of the user.
pub const PRESETS: &str = "presets";

static RELATIONS: Relations = Relations {
    belongs_to: None,
    has_many: &[
        Relation::new(EntityKind::Timesheet, TIMESHEETS, timesheet::USER),
        Relation::new(EntityKind::Preset, PRESETS, preset::USER),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: Role::Employee,
            active: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Attributes for User {
    const KIND: EntityKind = EntityKind::User;

    fn relations() -> &'static Relations {
        &RELATIONS
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::new("email", format!("'{}' is not an email address", self.email)));
        }
        Ok(())
    }

    fn slice(state: &RootState) -> &EntitySlice<Self> {
        &state.users
    }

    fn slice_mut(state: &mut RootState) -> &mut EntitySlice<Self> {
        &mut state.users
    }

    fn wrap(action: SliceAction<Self>) -> Action {
        Action::Users(action)
    }
}
