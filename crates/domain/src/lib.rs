//! Shared domain types for callsim.
//!
//! Everything the other crates agree on lives here: the common error type,
//! structured trace events, the incident report and its merge rules, the
//! training scenario catalogue, and the TOML configuration model.

pub mod config;
pub mod error;
pub mod report;
pub mod scenario;
pub mod trace;

pub use error::{Error, Result};
pub use report::IncidentReport;
pub use scenario::Scenario;
