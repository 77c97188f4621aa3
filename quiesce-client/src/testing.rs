//! In-memory platform used by the unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::{ClientError, Result};
use crate::services::{
    CreateResult, EntityHit, EntityQuery, EntityService, EntityTypeInfo, SettingsPage,
    SettingsQuery, SettingsStore,
};

/// Records every call and serves canned responses
#[derive(Default)]
pub struct FakePlatform {
    pages: Mutex<VecDeque<SettingsPage>>,
    objects: HashMap<String, Value>,
    entity_types: Option<Vec<EntityTypeInfo>>,
    entities: HashMap<String, Vec<EntityHit>>,
    fail_listings: bool,
    fail_searches: bool,
    failing_schemas: Vec<String>,
    idless_schemas: Vec<String>,
    calls: Mutex<Vec<String>>,
    page_keys: Mutex<Vec<Option<String>>>,
    search_page_sizes: Mutex<Vec<u32>>,
    created: Mutex<Vec<Value>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_page(self, items: Vec<Value>, next_page_key: Option<&str>) -> Self {
        self.pages.lock().unwrap().push_back(SettingsPage {
            items,
            next_page_key: next_page_key.map(String::from),
            total_count: None,
        });
        self
    }

    pub fn with_settings_object(mut self, object_id: &str, object: Value) -> Self {
        self.objects.insert(object_id.to_string(), object);
        self
    }

    pub fn with_entity_types(mut self, types: Vec<EntityTypeInfo>) -> Self {
        self.entity_types = Some(types);
        self
    }

    pub fn with_entities(mut self, selector: &str, hits: Vec<EntityHit>) -> Self {
        self.entities.insert(selector.to_string(), hits);
        self
    }

    pub fn failing_listings(mut self) -> Self {
        self.fail_listings = true;
        self
    }

    pub fn failing_searches(mut self) -> Self {
        self.fail_searches = true;
        self
    }

    pub fn failing_creates_for(mut self, schema_id: &str) -> Self {
        self.failing_schemas.push(schema_id.to_string());
        self
    }

    pub fn without_object_ids_for(mut self, schema_id: &str) -> Self {
        self.idless_schemas.push(schema_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_keys_requested(&self) -> Vec<Option<String>> {
        self.page_keys.lock().unwrap().clone()
    }

    pub fn search_page_sizes(&self) -> Vec<u32> {
        self.search_page_sizes.lock().unwrap().clone()
    }

    /// Objects accepted by creation calls, in order
    pub fn created_objects(&self) -> Vec<Value> {
        self.created.lock().unwrap().clone()
    }

    pub fn created_schemas(&self) -> Vec<String> {
        self.created_objects()
            .iter()
            .filter_map(|object| object["schemaId"].as_str().map(String::from))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected() -> ClientError {
        ClientError::Api {
            status: 400,
            message: r#"{"error":{"code":400,"message":"Rejected by fake platform"}}"#.to_string(),
        }
    }
}

#[async_trait]
impl SettingsStore for FakePlatform {
    async fn list_settings(&self, query: &SettingsQuery, page_key: Option<&str>) -> Result<SettingsPage> {
        self.record(format!("list:{}", query.schema_ids));
        self.page_keys.lock().unwrap().push(page_key.map(String::from));

        if self.fail_listings {
            return Err(Self::rejected());
        }
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn get_settings_object(&self, object_id: &str) -> Result<Value> {
        self.record(format!("get:{}", object_id));
        self.objects
            .get(object_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(object_id.to_string()))
    }

    async fn create_settings_objects(&self, objects: Vec<Value>) -> Result<Vec<CreateResult>> {
        let mut results = Vec::new();

        for object in objects {
            let schema = object["schemaId"].as_str().unwrap_or_default().to_string();
            self.record(format!("create:{}", schema));

            if self.failing_schemas.contains(&schema) {
                return Err(Self::rejected());
            }

            let mut created = self.created.lock().unwrap();
            created.push(object);
            let object_id = (!self.idless_schemas.contains(&schema)).then(|| format!("obj-{}", created.len()));

            results.push(CreateResult {
                code: Some(200),
                object_id,
                error: None,
            });
        }

        Ok(results)
    }
}

#[async_trait]
impl EntityService for FakePlatform {
    async fn list_entity_types(&self) -> Result<Vec<EntityTypeInfo>> {
        self.record("entity-types".to_string());
        self.entity_types.clone().ok_or_else(Self::rejected)
    }

    async fn search_entities(&self, query: &EntityQuery) -> Result<Vec<EntityHit>> {
        self.record(format!("search:{}", query.entity_selector));
        self.search_page_sizes.lock().unwrap().push(query.page_size);

        if self.fail_searches {
            return Err(Self::rejected());
        }

        let hits = self.entities.get(&query.entity_selector).cloned().unwrap_or_default();
        Ok(hits.into_iter().take(query.page_size as usize).collect())
    }
}
