//! Common types and logic shared between the quiesce client and front ends
//!
//! Everything in this crate is pure: no network, no clock reads other than
//! the local-time fallback in date parsing. The client crate feeds these
//! functions with data fetched from the monitoring platform.

pub mod bulk;
pub mod compiler;
pub mod entity_types;
pub mod format;
pub mod model;
pub mod selector;
pub mod session;
pub mod timezone;
pub mod validation;
pub mod window;

pub use model::*;
pub use validation::ValidationError;

/// Settings schema holding maintenance windows
pub const MAINTENANCE_WINDOW_SCHEMA: &str = "builtin:alerting.maintenance-window";

/// Settings schema holding management zones
pub const MANAGEMENT_ZONE_SCHEMA: &str = "builtin:management-zones";

/// Settings schema holding auto-tagging rules
pub const AUTO_TAGGING_SCHEMA: &str = "builtin:tags.auto-tagging";

/// Scope every object created by this tool is written to
pub const ENVIRONMENT_SCOPE: &str = "environment";

/// Domain error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Please enter at least one host name.")]
    EmptyHostList,

    #[error("Could not find the following hosts: {}", .0.join(", "))]
    UnresolvedHosts(Vec<String>),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
