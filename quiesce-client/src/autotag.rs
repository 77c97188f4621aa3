//! Auto-tagging policy creation

use tracing::{error, info};

use quiesce_common::compiler::build_auto_tag_payload;
use quiesce_common::AutoTagRule;

use crate::error::Result;
use crate::services::SettingsStore;

/// Create an auto-tagging policy and return its object id.
///
/// `Ok(None)` means the store accepted the call but reported no id.
pub async fn create_auto_tag_with_rules<S>(
    store: &S,
    tag_name: &str,
    tag_value: &str,
    rules: Vec<AutoTagRule>,
) -> Result<Option<String>>
where
    S: SettingsStore + ?Sized,
{
    let rule_count = rules.len();
    let payload = serde_json::to_value(build_auto_tag_payload(tag_name, tag_value, rules))?;

    let results = store.create_settings_objects(vec![payload]).await.map_err(|e| {
        error!("Failed to create auto-tag {}: {}", tag_name, e);
        e
    })?;

    let object_id = results.into_iter().next().and_then(|result| result.object_id);
    if let Some(id) = &object_id {
        info!("Created auto-tag {} ({}) with {} rules", tag_name, id, rule_count);
    }

    Ok(object_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;
    use quiesce_common::AUTO_TAGGING_SCHEMA;

    fn rule() -> AutoTagRule {
        AutoTagRule {
            rule_type: "SELECTOR".to_string(),
            enabled: true,
            entity_selector: r#"type(HOST),entityId("HOST-1")"#.to_string(),
            value_format: "delete after expiration".to_string(),
            value_normalization: "Leave text as-is".to_string(),
        }
    }

    #[tokio::test]
    async fn test_returns_object_id() {
        let platform = FakePlatform::new();
        let id = create_auto_tag_with_rules(&platform, "Maintenance — x", "delete after expiration", vec![rule()])
            .await
            .unwrap();
        assert!(id.is_some());

        let created = platform.created_objects();
        assert_eq!(created[0]["schemaId"], AUTO_TAGGING_SCHEMA);
        assert_eq!(created[0]["value"]["rules"][0]["type"], "SELECTOR");
        assert_eq!(created[0]["value"]["rules"][0]["entitySelector"], r#"type(HOST),entityId("HOST-1")"#);
    }

    #[tokio::test]
    async fn test_missing_id_is_none() {
        let platform = FakePlatform::new().without_object_ids_for(AUTO_TAGGING_SCHEMA);
        let id = create_auto_tag_with_rules(&platform, "t", "v", vec![rule()]).await.unwrap();
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let platform = FakePlatform::new().failing_creates_for(AUTO_TAGGING_SCHEMA);
        assert!(create_auto_tag_with_rules(&platform, "t", "v", vec![rule()]).await.is_err());
    }
}
