//! HTTP client for the monitoring platform's environment API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{remote_message, ClientError, Result};
use crate::pagination::PageKeys;
use crate::services::{
    CreateResult, EntityHit, EntityQuery, EntityService, EntityTypeInfo, SettingsPage,
    SettingsQuery, SettingsStore,
};

const SETTINGS_OBJECTS_PATH: &str = "/api/v2/settings/objects";
const ENTITIES_PATH: &str = "/api/v2/entities";
const ENTITY_TYPES_PATH: &str = "/api/v2/entityTypes";
const ENTITY_TYPES_PAGE_SIZE: u32 = 500;

/// Environment API client
#[derive(Clone)]
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntitiesResponse {
    #[serde(default)]
    entities: Vec<EntityHit>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityTypesResponse {
    #[serde(default)]
    types: Vec<EntityTypeInfo>,
    #[serde(default)]
    next_page_key: Option<String>,
}

impl PlatformClient {
    /// Create a new client for an environment URL
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the API token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build headers for requests
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Api-Token {}", token))
                .map_err(|_| ClientError::Config("API token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// GET request with query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else if status.as_u16() == 401 {
            Err(ClientError::AuthFailed)
        } else if status.as_u16() == 404 {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::NotFound(
                remote_message(&body).unwrap_or_else(|| "Resource not found".to_string()),
            ))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Query parameters of a settings listing request
pub(crate) fn settings_query_params(query: &SettingsQuery, page_key: Option<&str>) -> Vec<(&'static str, String)> {
    // the platform rejects other parameters alongside a page key
    if let Some(key) = page_key {
        return vec![("nextPageKey", key.to_string())];
    }

    let mut params = vec![
        ("schemaIds", query.schema_ids.clone()),
        ("pageSize", query.page_size.to_string()),
    ];
    if let Some(fields) = &query.fields {
        params.push(("fields", fields.clone()));
    }
    params
}

/// Fail when any object of a creation call was rejected
pub(crate) fn check_create_results(results: Vec<CreateResult>) -> Result<Vec<CreateResult>> {
    if let Some(rejected) = results.iter().find(|result| result.error.is_some()) {
        let error = rejected.error.clone().unwrap_or_default();
        let status = error.code.or(rejected.code).unwrap_or(400);
        let message = serde_json::json!({ "error": { "code": status, "message": error.message } });
        return Err(ClientError::Api {
            status,
            message: message.to_string(),
        });
    }
    Ok(results)
}

#[async_trait]
impl SettingsStore for PlatformClient {
    async fn list_settings(&self, query: &SettingsQuery, page_key: Option<&str>) -> Result<SettingsPage> {
        self.get(SETTINGS_OBJECTS_PATH, &settings_query_params(query, page_key)).await
    }

    async fn get_settings_object(&self, object_id: &str) -> Result<Value> {
        self.get(&format!("{}/{}", SETTINGS_OBJECTS_PATH, object_id), &[]).await
    }

    async fn create_settings_objects(&self, objects: Vec<Value>) -> Result<Vec<CreateResult>> {
        let results: Vec<CreateResult> = self.post(SETTINGS_OBJECTS_PATH, &objects).await?;
        check_create_results(results)
    }
}

#[async_trait]
impl EntityService for PlatformClient {
    async fn list_entity_types(&self) -> Result<Vec<EntityTypeInfo>> {
        let mut types = Vec::new();
        let mut keys = PageKeys::default();
        let mut page_key: Option<String> = None;

        loop {
            let params = match &page_key {
                Some(key) => vec![("nextPageKey", key.clone())],
                None => vec![("pageSize", ENTITY_TYPES_PAGE_SIZE.to_string())],
            };

            let page: EntityTypesResponse = self.get(ENTITY_TYPES_PATH, &params).await?;
            types.extend(page.types);

            page_key = keys.next(page.next_page_key, ENTITY_TYPES_PATH);
            if page_key.is_none() {
                break;
            }
        }

        Ok(types)
    }

    async fn search_entities(&self, query: &EntityQuery) -> Result<Vec<EntityHit>> {
        let params = [
            ("entitySelector", query.entity_selector.clone()),
            ("from", query.from.clone()),
            ("pageSize", query.page_size.to_string()),
        ];

        let response: EntitiesResponse = self.get(ENTITIES_PATH, &params).await?;
        Ok(response.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorBody;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = PlatformClient::new("https://abc123.live.example.com/").unwrap();
        assert_eq!(client.base_url(), "https://abc123.live.example.com");
    }

    #[test]
    fn test_token_header() {
        let client = PlatformClient::new("https://env").unwrap().with_token("dt0c01.secret");
        let headers = client.headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Api-Token dt0c01.secret");

        let bad = PlatformClient::new("https://env").unwrap().with_token("line\nbreak");
        assert!(matches!(bad.headers(), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_first_page_params() {
        let query = SettingsQuery::new("builtin:management-zones", 500).with_fields("objectId,value");
        let params = settings_query_params(&query, None);
        assert_eq!(
            params,
            vec![
                ("schemaIds", "builtin:management-zones".to_string()),
                ("pageSize", "500".to_string()),
                ("fields", "objectId,value".to_string()),
            ]
        );
    }

    #[test]
    fn test_next_page_params_only_carry_the_key() {
        let query = SettingsQuery::new("builtin:management-zones", 500);
        assert_eq!(
            settings_query_params(&query, Some("abc")),
            vec![("nextPageKey", "abc".to_string())]
        );
    }

    #[test]
    fn test_rejected_create_result() {
        let ok = vec![CreateResult {
            code: Some(200),
            object_id: Some("obj-1".to_string()),
            error: None,
        }];
        assert_eq!(check_create_results(ok).unwrap().len(), 1);

        let rejected = vec![CreateResult {
            code: Some(400),
            object_id: None,
            error: Some(ErrorBody {
                code: Some(400),
                message: Some("Invalid rule".to_string()),
            }),
        }];
        let err = check_create_results(rejected).unwrap_err();
        assert_eq!(err.user_message(), "Invalid rule");
    }
}
