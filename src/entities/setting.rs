//! Application-wide settings managed by administrators.

use serde::{Deserialize, Serialize};

use super::{Attributes, EntityKind, ValidationError};
use crate::store::{Action, EntitySlice, Relations, RootState, SliceAction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Attributes for Setting {
    const KIND: EntityKind = EntityKind::Setting;

    fn relations() -> &'static Relations {
        &Relations::NONE
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.key.trim().is_empty() {
            return Err(ValidationError::new("key", "must not be empty"));
        }
        Ok(())
    }

    fn slice(state: &RootState) -> &EntitySlice<Self> {
        &state.settings
    }

    fn slice_mut(state: &mut RootState) -> &mut EntitySlice<Self> {
        &mut state.settings
    }

    fn wrap(action: SliceAction<Self>) -> Action {
        Action::Settings(action)
    }
}
