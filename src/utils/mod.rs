//! Utility modules for the timesheets crate.
//!
//! - [`datetime`] - Week, date and wall-clock helpers used by entity attributes

pub mod datetime;
