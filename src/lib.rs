//! Timesheets - normalized entity store for a timesheet REST backend
//!
//! This library keeps a client-side, relationship-aware cache of the
//! records served by a JSON:API timesheet backend (users, timesheets,
//! shifts, absences, presets and settings) and synchronizes it with the
//! backend.
//!
//! # Modules
//!
//! * [`config`] - Application configuration management
//! * [`entities`] - Entity records and the business types they carry
//! * [`store`] - Normalized store, relationship bookkeeping and selectors
//! * [`api`] - JSON:API wire types and the HTTP backend
//! * [`sync`] - Fetch orchestration and write paths
//! * [`utils`] - Utility functions and helpers

/// Backend abstraction layer and JSON:API wire types
pub mod api;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Entity records and business types
pub mod entities;

/// Logging setup
pub mod logger;

/// Normalized client-side entity store
pub mod store;

/// Synchronization between the backend and the store
pub mod sync;

/// Utility functions for date/time handling
pub mod utils;

pub use entities::{Entity, EntityId, EntityKind};
pub use store::{RootStore, Status};
pub use sync::{FetchOutcome, SyncService};
