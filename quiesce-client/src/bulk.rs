//! Bulk host resolution
//!
//! Each pasted name is tried as an exact display name, then as an exact
//! detected name, then as a substring that must match exactly one host.

use tracing::{debug, warn};

use quiesce_common::bulk::{host_reference, BulkHostsDraft, HostResolution, HOST_ENTITY_TYPE};
use quiesce_common::selector::{detected_name_equals_selector, name_contains_selector, name_equals_selector};
use quiesce_common::{EntityFilter, EntityReference};

use crate::error::Result;
use crate::search::SEARCH_WINDOW;
use crate::services::{EntityHit, EntityQuery, EntityService};

const EXACT_PAGE_SIZE: u32 = 1;
const CONTAINS_PAGE_SIZE: u32 = 5;

fn to_host(hit: &EntityHit) -> EntityReference {
    host_reference(hit.entity_id.as_deref(), hit.display_name.as_deref())
}

async fn find_hosts<E>(entities: &E, selector: String, page_size: u32) -> Result<Vec<EntityHit>>
where
    E: EntityService + ?Sized,
{
    let query = EntityQuery {
        entity_selector: selector,
        from: SEARCH_WINDOW.to_string(),
        page_size,
    };
    entities.search_entities(&query).await
}

async fn try_resolve<E>(entities: &E, host_name: &str) -> Result<Option<EntityReference>>
where
    E: EntityService + ?Sized,
{
    let exact = find_hosts(entities, name_equals_selector(HOST_ENTITY_TYPE, host_name), EXACT_PAGE_SIZE).await?;
    if let Some(hit) = exact.first() {
        return Ok(Some(to_host(hit)));
    }

    let detected =
        find_hosts(entities, detected_name_equals_selector(HOST_ENTITY_TYPE, host_name), EXACT_PAGE_SIZE).await?;
    if let Some(hit) = detected.first() {
        return Ok(Some(to_host(hit)));
    }

    let contains =
        find_hosts(entities, name_contains_selector(HOST_ENTITY_TYPE, host_name), CONTAINS_PAGE_SIZE).await?;
    match contains.as_slice() {
        [only] => Ok(Some(to_host(only))),
        [] => Ok(None),
        ambiguous => {
            debug!("Host name {} is ambiguous ({} matches)", host_name, ambiguous.len());
            Ok(None)
        }
    }
}

/// Resolve one host name; lookup failures count as unresolved
pub async fn resolve_host_by_name<E>(entities: &E, host_name: &str) -> Option<EntityReference>
where
    E: EntityService + ?Sized,
{
    match try_resolve(entities, host_name).await {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("Failed to resolve host {}: {}", host_name, e);
            None
        }
    }
}

/// Resolve names one after another, keeping input order
pub async fn resolve_hosts<E>(entities: &E, host_names: &[String]) -> HostResolution
where
    E: EntityService + ?Sized,
{
    let mut resolution = HostResolution::default();

    for host_name in host_names {
        match resolve_host_by_name(entities, host_name).await {
            Some(host) => resolution.resolved.push(host),
            None => resolution.unresolved.push(host_name.clone()),
        }
    }

    resolution
}

/// Parse, resolve and materialize the bulk draft into filter groups.
///
/// Any unresolved name fails the whole batch.
pub async fn process_bulk_hosts<E>(entities: &E, draft: &BulkHostsDraft) -> Result<Vec<EntityFilter>>
where
    E: EntityService + ?Sized,
{
    let host_names = draft.host_names()?;
    let resolution = resolve_hosts(entities, &host_names).await;
    Ok(resolution.into_filters(draft)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::FakePlatform;

    fn hit(id: &str, name: &str) -> EntityHit {
        EntityHit {
            entity_id: Some(id.to_string()),
            display_name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn test_exact_name_wins() {
        let platform = FakePlatform::new()
            .with_entities(&name_equals_selector("HOST", "web-01"), vec![hit("HOST-1", "web-01")]);

        let host = resolve_host_by_name(&platform, "web-01").await.unwrap();
        assert_eq!(host.entity_id, "HOST-1");
        assert_eq!(platform.search_page_sizes(), vec![1]);
    }

    #[tokio::test]
    async fn test_detected_name_fallback() {
        let platform = FakePlatform::new().with_entities(
            &detected_name_equals_selector("HOST", "ip-10-0-0-1"),
            vec![EntityHit {
                entity_id: Some("HOST-7".to_string()),
                display_name: None,
            }],
        );

        let host = resolve_host_by_name(&platform, "ip-10-0-0-1").await.unwrap();
        assert_eq!(host.display_name, "HOST-7");
        assert_eq!(platform.search_page_sizes(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_unique_substring_accepted() {
        let platform = FakePlatform::new()
            .with_entities(&name_contains_selector("HOST", "db"), vec![hit("HOST-3", "prod-db-01")]);

        let host = resolve_host_by_name(&platform, "db").await.unwrap();
        assert_eq!(host.entity_id, "HOST-3");
        assert_eq!(platform.search_page_sizes(), vec![1, 1, 5]);
    }

    #[tokio::test]
    async fn test_ambiguous_substring_rejected() {
        let platform = FakePlatform::new().with_entities(
            &name_contains_selector("HOST", "web-02"),
            vec![hit("HOST-2", "web-02a"), hit("HOST-9", "web-02b")],
        );
        assert!(resolve_host_by_name(&platform, "web-02").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_error_counts_as_unresolved() {
        let platform = FakePlatform::new().failing_searches();
        assert!(resolve_host_by_name(&platform, "web-01").await.is_none());
    }

    #[tokio::test]
    async fn test_process_bulk_hosts_all_or_nothing() {
        let platform = FakePlatform::new()
            .with_entities(&name_equals_selector("HOST", "web-01"), vec![hit("HOST-1", "web-01")])
            .with_entities(
                &name_contains_selector("HOST", "web-02"),
                vec![hit("HOST-2", "web-02a"), hit("HOST-9", "web-02b")],
            );

        let draft = BulkHostsDraft {
            input: "web-01, web-01,  web-02".to_string(),
            ..Default::default()
        };

        let err = process_bulk_hosts(&platform, &draft).await.unwrap_err();
        assert_eq!(err.user_message(), "Could not find the following hosts: web-02");
        assert!(matches!(err, ClientError::Domain(_)));
    }

    #[tokio::test]
    async fn test_process_bulk_hosts() {
        let platform = FakePlatform::new()
            .with_entities(&name_equals_selector("HOST", "web-01"), vec![hit("HOST-1", "web-01")])
            .with_entities(&name_equals_selector("HOST", "web-02"), vec![hit("HOST-2", "web-02")]);

        let draft = BulkHostsDraft {
            input: "web-01\nweb-02".to_string(),
            include_services: true,
            ..Default::default()
        };

        let filters = process_bulk_hosts(&platform, &draft).await.unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].entities[0].entity_id, "HOST-2");
        assert!(filters[0].underlying_options.include_services);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let platform = FakePlatform::new();
        let err = process_bulk_hosts(&platform, &BulkHostsDraft::new()).await.unwrap_err();
        assert_eq!(err.user_message(), "Please enter at least one host name.");
        assert!(platform.calls().is_empty());
    }
}
