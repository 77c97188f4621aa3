//! Platform service traits
//!
//! The orchestration code only talks to these traits, so it can run against
//! the real HTTP client or against in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{ErrorBody, Result};

/// Identity used when no user email is configured
pub const ANONYMOUS_EMAIL: &str = "unknown@localhost";

/// Query of the settings-object listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsQuery {
    pub schema_ids: String,
    pub page_size: u32,
    pub fields: Option<String>,
}

impl SettingsQuery {
    pub fn new(schema_id: &str, page_size: u32) -> Self {
        Self {
            schema_ids: schema_id.to_string(),
            page_size,
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: &str) -> Self {
        self.fields = Some(fields.to_string());
        self
    }
}

/// One page of settings objects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub next_page_key: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Per-object result of a settings creation call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub error: Option<ErrorBody>,
}

/// Entity search by selector expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityQuery {
    pub entity_selector: String,
    pub from: String,
    pub page_size: u32,
}

/// Entity as returned by the topology API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityHit {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Entity type as listed by the topology API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeInfo {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// The operator submitting changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
}

/// Settings-object store
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch one page; with a page key, only the key is sent
    async fn list_settings(&self, query: &SettingsQuery, page_key: Option<&str>) -> Result<SettingsPage>;

    /// Fetch a single object by id
    async fn get_settings_object(&self, object_id: &str) -> Result<Value>;

    /// Create objects; results come back in request order
    async fn create_settings_objects(&self, objects: Vec<Value>) -> Result<Vec<CreateResult>>;
}

/// Topology and entity-type lookups
#[async_trait]
pub trait EntityService: Send + Sync {
    async fn list_entity_types(&self) -> Result<Vec<EntityTypeInfo>>;

    async fn search_entities(&self, query: &EntityQuery) -> Result<Vec<EntityHit>>;
}

/// Who is submitting
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<CurrentUser>;
}

/// Identity taken from local configuration
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    email: Option<String>,
}

impl StaticIdentity {
    pub fn new(email: Option<String>) -> Self {
        Self {
            email: email.filter(|e| !e.trim().is_empty()),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<CurrentUser> {
        let email = match &self.email {
            Some(email) => email.trim().to_string(),
            None => {
                warn!("No user email configured, stamping windows as {}", ANONYMOUS_EMAIL);
                ANONYMOUS_EMAIL.to_string()
            }
        };

        Ok(CurrentUser { email })
    }
}
