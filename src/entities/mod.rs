//! Normalized entity records and the business types they carry.
//!
//! Every record in the store is an [`Entity`]: a backend-assigned ID, the
//! typed attributes of its kind, and the IDs of the entities it is related
//! to. The relationship IDs are plain data; resolving them against the
//! store is the job of the selectors.

pub mod absence;
pub mod preset;
pub mod setting;
pub mod shift;
pub mod timesheet;
pub mod user;

pub use absence::{Absence, AbsenceKind};
pub use preset::Preset;
pub use setting::Setting;
pub use shift::Shift;
pub use timesheet::{Timesheet, TimesheetStatus};
pub use user::{Role, User};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::api::{ApiError, Resource};
use crate::constants::PROVISIONAL_ID_PREFIX;
use crate::store::{Action, EntitySlice, Relations, RootState, SliceAction};

/// The business object types held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Timesheet,
    Shift,
    Absence,
    Preset,
    Setting,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::User,
        EntityKind::Timesheet,
        EntityKind::Shift,
        EntityKind::Absence,
        EntityKind::Preset,
        EntityKind::Setting,
    ];

    /// JSON:API `type` and URL path segment for this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Timesheet => "timesheets",
            EntityKind::Shift => "shifts",
            EntityKind::Absence => "absences",
            EntityKind::Preset => "presets",
            EntityKind::Setting => "settings",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        EntityKind::ALL.into_iter().find(|kind| kind.type_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Identifier of an entity, as assigned by the backend.
///
/// Entities created optimistically carry a provisional ID until the backend
/// answers; see [`EntityId::provisional`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh local-only ID for a not-yet-persisted entity.
    pub fn provisional() -> Self {
        Self(format!("{PROVISIONAL_ID_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One side of a declared relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// `belongsTo`: the parent, `None` while unset or after the parent was removed
    One(Option<EntityId>),
    /// `hasMany`: ordered child IDs, without duplicates
    Many(Vec<EntityId>),
}

impl Link {
    pub fn contains(&self, id: &EntityId) -> bool {
        match self {
            Link::One(parent) => parent.as_ref() == Some(id),
            Link::Many(ids) => ids.contains(id),
        }
    }

    pub fn ids(&self) -> &[EntityId] {
        match self {
            Link::One(Some(id)) => std::slice::from_ref(id),
            Link::One(None) => &[],
            Link::Many(ids) => ids,
        }
    }

    /// Drop `id` from this link. Returns whether anything changed.
    pub fn strip(&mut self, id: &EntityId) -> bool {
        match self {
            Link::One(parent) if parent.as_ref() == Some(id) => {
                *parent = None;
                true
            }
            Link::One(_) => false,
            Link::Many(ids) => {
                let before = ids.len();
                ids.retain(|existing| existing != id);
                ids.len() != before
            }
        }
    }

    /// Append `id` to a `Many` link unless already present.
    pub fn push(&mut self, id: &EntityId) -> bool {
        match self {
            Link::Many(ids) if !ids.contains(id) => {
                ids.push(id.clone());
                true
            }
            _ => false,
        }
    }

    /// Rename every occurrence of `from` to `to`.
    pub fn rename(&mut self, from: &EntityId, to: &EntityId) {
        match self {
            Link::One(Some(parent)) if parent == from => *parent = to.clone(),
            Link::One(_) => {}
            Link::Many(ids) => {
                for id in ids.iter_mut().filter(|id| *id == from) {
                    *id = to.clone();
                }
            }
        }
    }

    fn dedup(self) -> Self {
        match self {
            Link::Many(ids) => {
                let mut unique: Vec<EntityId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !unique.contains(&id) {
                        unique.push(id);
                    }
                }
                Link::Many(unique)
            }
            one => one,
        }
    }
}

/// Relationship name (a descriptor's foreign key) to the linked IDs.
pub type Relationships = BTreeMap<&'static str, Link>;

/// A normalized record of one business object.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<A> {
    pub id: EntityId,
    pub attributes: A,
    pub relationships: Relationships,
}

impl<A> Entity<A> {
    pub fn new(id: impl Into<EntityId>, attributes: A) -> Self {
        Self {
            id: id.into(),
            attributes,
            relationships: Relationships::new(),
        }
    }

    /// An entity not yet known to the backend, under a provisional ID.
    pub fn draft(attributes: A) -> Self {
        Self::new(EntityId::provisional(), attributes)
    }

    /// Set a `belongsTo` link.
    pub fn with_parent(mut self, name: &'static str, parent: impl Into<EntityId>) -> Self {
        self.relationships.insert(name, Link::One(Some(parent.into())));
        self
    }

    /// Set a `hasMany` link; duplicate IDs are collapsed.
    pub fn with_children<I, T>(mut self, name: &'static str, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        let ids = children.into_iter().map(Into::into).collect();
        self.relationships.insert(name, Link::Many(ids).dedup());
        self
    }

    pub fn with_link(mut self, name: &'static str, link: Link) -> Self {
        self.relationships.insert(name, link.dedup());
        self
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_provisional()
    }

    pub fn parent_id(&self, name: &str) -> Option<&EntityId> {
        match self.relationships.get(name) {
            Some(Link::One(parent)) => parent.as_ref(),
            _ => None,
        }
    }

    pub fn child_ids(&self, name: &str) -> &[EntityId] {
        match self.relationships.get(name) {
            Some(Link::Many(ids)) => ids,
            _ => &[],
        }
    }

    pub(crate) fn normalize_links(&mut self) {
        let links = std::mem::take(&mut self.relationships);
        self.relationships = links.into_iter().map(|(name, link)| (name, link.dedup())).collect();
    }
}

/// A local form-level validation failure. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Typed attributes of one entity kind, plus the static wiring that lets the
/// store build and address a slice for it.
pub trait Attributes: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Relationship descriptors, fixed for the process lifetime.
    fn relations() -> &'static Relations;

    /// Local checks run before any backend write.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Attribute extraction from a wire resource.
    fn extract(resource: &Resource) -> Result<Self, ApiError> {
        serde_json::from_value(resource.attributes.clone()).map_err(|e| {
            ApiError::InvalidResource(format!(
                "{} {}: {e}",
                Self::KIND,
                resource.id.as_deref().unwrap_or("<new>")
            ))
        })
    }

    fn slice(state: &RootState) -> &EntitySlice<Self>;

    fn slice_mut(state: &mut RootState) -> &mut EntitySlice<Self>;

    /// Route a slice action to this kind's slice.
    fn wrap(action: SliceAction<Self>) -> Action;
}
