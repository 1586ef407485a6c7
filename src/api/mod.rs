//! Backend abstraction layer.
//!
//! The store never talks HTTP itself. The sync service goes through the
//! [`Backend`] trait, implemented by [`HttpBackend`] for the real JSON:API
//! server and by test doubles in the test suite.

use async_trait::async_trait;

pub mod http;
pub mod resource;

pub use http::HttpBackend;
pub use resource::{Document, Linkage, Relationship, Resource, ResourceIdentifier};

use crate::entities::{EntityId, EntityKind};

/// Common error types for backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),
}

/// Backend trait that the sync service talks to.
///
/// Every call addresses the collection of one entity kind.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /<type>`: every resource of the kind, in server order.
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Resource>, ApiError>;

    /// `POST /<type>`: returns the persisted resource with its assigned ID.
    async fn create(&self, kind: EntityKind, resource: Resource) -> Result<Resource, ApiError>;

    /// `PATCH /<type>/<id>`
    async fn update(&self, kind: EntityKind, id: &EntityId, resource: Resource) -> Result<Resource, ApiError>;

    /// `DELETE /<type>/<id>`
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), ApiError>;
}
