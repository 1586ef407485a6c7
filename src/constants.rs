//! Constants used throughout the application
//!
//! This module centralizes magic strings, log text, and default values
//! to improve maintainability and consistency.

/// Application name, used for config and data directories
pub const APP_NAME: &str = "timesheets";

/// Config file looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "timesheets.toml";

/// Log file name inside the data directory
pub const LOG_FILE_NAME: &str = "timesheets.log";

// API defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Prefix of IDs handed out to optimistically created entities
pub const PROVISIONAL_ID_PREFIX: &str = "tmp-";

// Log Messages
pub const LOG_FETCH_STARTED: &str = "🔄 Fetching";
pub const LOG_FETCH_SKIPPED_IN_FLIGHT: &str = "⏳ Fetch already in flight for";
pub const LOG_FETCH_DISCARDED: &str = "⚠️  Discarding stale response for";
pub const LOG_STORE_CLEARED: &str = "🧹 Store cleared";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
