#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use timesheets::api::{ApiError, Backend, Linkage, Relationship, Resource, ResourceIdentifier};
use timesheets::entities::{timesheet, Entity, EntityId, EntityKind, Timesheet, User};

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn user(id: &str) -> Entity<User> {
    Entity::new(id, User::new(format!("User {id}"), format!("{id}@example.com")))
}

pub fn sheet(id: &str, owner: &str) -> Entity<Timesheet> {
    Entity::new(id, Timesheet::for_week_of(monday())).with_parent(timesheet::USER, owner)
}

pub fn ids(list: &[EntityId]) -> Vec<&str> {
    list.iter().map(|id| id.as_str()).collect()
}

pub fn one(kind: &str, id: &str) -> Relationship {
    Relationship::new(Linkage::One(Some(ResourceIdentifier {
        id: id.to_string(),
        kind: kind.to_string(),
    })))
}

pub fn many(kind: &str, ids: &[&str]) -> Relationship {
    Relationship::new(Linkage::Many(
        ids.iter()
            .map(|id| ResourceIdentifier {
                id: id.to_string(),
                kind: kind.to_string(),
            })
            .collect(),
    ))
}

pub fn resource(kind: EntityKind, id: &str, attributes: Value, relationships: Vec<(&str, Relationship)>) -> Resource {
    Resource {
        id: Some(id.to_string()),
        kind: kind.type_name().to_string(),
        attributes,
        relationships: relationships
            .into_iter()
            .map(|(name, rel)| (name.to_string(), rel))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub fn user_resource(id: &str, name: &str) -> Resource {
    resource(
        EntityKind::User,
        id,
        json!({ "name": name, "email": format!("{id}@example.com"), "role": "employee" }),
        vec![],
    )
}

pub fn timesheet_resource(id: &str, owner: &str) -> Resource {
    resource(
        EntityKind::Timesheet,
        id,
        json!({ "week_start": "2024-01-01", "status": "draft" }),
        vec![("user", one("users", owner))],
    )
}

pub fn shift_resource(id: &str, sheet: &str, start: &str, end: &str) -> Resource {
    resource(
        EntityKind::Shift,
        id,
        json!({ "date": "2024-01-02", "start": start, "end": end, "break_minutes": 30 }),
        vec![("timesheet", one("timesheets", sheet))],
    )
}

/// In-memory backend with call counters, optional gates that hold fetches
/// or creates until released, and switchable failures.
#[derive(Default)]
pub struct MockBackend {
    collections: Mutex<HashMap<EntityKind, Vec<Resource>>>,
    fetch_failure: Mutex<Option<ApiError>>,
    create_failure: Mutex<Option<ApiError>>,
    gone: Mutex<HashSet<String>>,
    gate: Option<Arc<Notify>>,
    create_gate: Option<Arc<Notify>>,
    pub fetch_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches block until the returned `Notify` is signalled, once per fetch.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (backend, gate)
    }

    /// Creates block until the returned `Notify` is signalled, once per create.
    pub fn gated_creates() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            create_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn with(self, kind: EntityKind, resources: Vec<Resource>) -> Self {
        self.collections.lock().unwrap().insert(kind, resources);
        self
    }

    pub fn fail_fetches(&self, error: Option<ApiError>) {
        *self.fetch_failure.lock().unwrap() = error;
    }

    pub fn fail_creates(&self, error: Option<ApiError>) {
        *self.create_failure.lock().unwrap() = error;
    }

    pub fn mark_gone(&self, id: &str) {
        self.gone.lock().unwrap().insert(id.to_string());
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Resource>, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(error) = self.fetch_failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.collections.lock().unwrap().get(&kind).cloned().unwrap_or_default())
    }

    async fn create(&self, kind: EntityKind, mut resource: Resource) -> Result<Resource, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
        if let Some(error) = self.create_failure.lock().unwrap().clone() {
            return Err(error);
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        resource.id = Some(format!("{}-{n}", kind.type_name()));
        Ok(resource)
    }

    async fn update(&self, _kind: EntityKind, id: &EntityId, mut resource: Resource) -> Result<Resource, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        resource.id = Some(id.to_string());
        Ok(resource)
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), ApiError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.gone.lock().unwrap().contains(id.as_str()) {
            return Err(ApiError::NotFound(format!("/{}/{id}", kind.type_name())));
        }
        Ok(())
    }
}
