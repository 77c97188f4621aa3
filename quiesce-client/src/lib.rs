//! Quiesce platform client
//!
//! Talks to the monitoring platform's settings and topology APIs and runs the
//! maintenance-window workflows on top of them: listing, entity search, bulk
//! host resolution and the auto-tag plus window creation flow.

pub mod autotag;
pub mod bulk;
pub mod client;
pub mod create;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod search;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use client::PlatformClient;
pub use error::{ClientError, Result};
pub use services::{EntityService, IdentityProvider, SettingsStore, StaticIdentity};
