//! Best-effort listings
//!
//! Listing failures are logged and degrade to empty results or the built-in
//! entity-type table; they never block the caller.

use serde_json::Value;
use tracing::{error, warn};

use quiesce_common::entity_types::{sort_by_label, EntityTypeOption, DEFAULT_ENTITY_TYPES};
use quiesce_common::window::{sort_zones, transform_api_items, MaintenanceWindowSummary, PAGE_SIZE};
use quiesce_common::{ManagementZone, MaintenanceWindowObject, MAINTENANCE_WINDOW_SCHEMA, MANAGEMENT_ZONE_SCHEMA};

use crate::error::Result;
use crate::pagination::fetch_all_settings;
use crate::services::{EntityService, SettingsQuery, SettingsStore};

/// Fields requested for maintenance windows
pub const WINDOW_FIELDS: &str = "objectId,value,created,modified,createdBy,modifiedBy,author,schemaVersion";

fn parse_window(item: Value) -> Option<MaintenanceWindowObject> {
    match serde_json::from_value(item) {
        Ok(window) => Some(window),
        Err(e) => {
            warn!("Skipping malformed maintenance window: {}", e);
            None
        }
    }
}

/// Every maintenance window, summarised
pub async fn fetch_maintenance_windows<S>(store: &S) -> Vec<MaintenanceWindowSummary>
where
    S: SettingsStore + ?Sized,
{
    let query = SettingsQuery::new(MAINTENANCE_WINDOW_SCHEMA, PAGE_SIZE as u32).with_fields(WINDOW_FIELDS);

    match fetch_all_settings(store, &query).await {
        Ok(items) => transform_api_items(items.into_iter().filter_map(parse_window).collect()),
        Err(e) => {
            error!("Failed to fetch maintenance windows: {}", e);
            Vec::new()
        }
    }
}

/// One maintenance window by object id
pub async fn fetch_maintenance_window<S>(store: &S, object_id: &str) -> Result<MaintenanceWindowSummary>
where
    S: SettingsStore + ?Sized,
{
    let item = store.get_settings_object(object_id).await?;
    let window: MaintenanceWindowObject = serde_json::from_value(item)?;
    Ok(MaintenanceWindowSummary::from_object(window))
}

/// Management zones sorted by name
pub async fn fetch_management_zones<S>(store: &S) -> Vec<ManagementZone>
where
    S: SettingsStore + ?Sized,
{
    let query = SettingsQuery::new(MANAGEMENT_ZONE_SCHEMA, PAGE_SIZE as u32);

    match fetch_all_settings(store, &query).await {
        Ok(items) => sort_zones(
            items
                .iter()
                .filter_map(|item| {
                    let id = item.get("objectId")?.as_str()?;
                    let name = item
                        .pointer("/value/name")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown");
                    Some(ManagementZone {
                        id: id.to_string(),
                        name: name.to_string(),
                    })
                })
                .collect(),
        ),
        Err(e) => {
            error!("Failed to fetch management zones: {}", e);
            Vec::new()
        }
    }
}

/// Entity types sorted by label, or the built-in table when unavailable
pub async fn fetch_entity_types<E>(entities: &E) -> Vec<EntityTypeOption>
where
    E: EntityService + ?Sized,
{
    match entities.list_entity_types().await {
        Ok(types) if !types.is_empty() => {
            let mut options: Vec<EntityTypeOption> = types
                .iter()
                .map(|t| EntityTypeOption::from_listed(&t.entity_type, t.display_name.as_deref()))
                .collect();
            sort_by_label(&mut options);
            options
        }
        Ok(_) => {
            warn!("Entity type listing was empty, using built-in types");
            DEFAULT_ENTITY_TYPES.clone()
        }
        Err(e) => {
            error!("Failed to fetch entity types: {}", e);
            DEFAULT_ENTITY_TYPES.clone()
        }
    }
}

/// Reference data needed to render windows and author filters
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub windows: Vec<MaintenanceWindowSummary>,
    pub zones: Vec<ManagementZone>,
    pub entity_types: Vec<EntityTypeOption>,
}

/// Load windows, zones and entity types concurrently
pub async fn load_catalog<S, E>(store: &S, entities: &E) -> Catalog
where
    S: SettingsStore + ?Sized,
    E: EntityService + ?Sized,
{
    let (windows, zones, entity_types) = tokio::join!(
        fetch_maintenance_windows(store),
        fetch_management_zones(store),
        fetch_entity_types(entities),
    );

    Catalog {
        windows,
        zones,
        entity_types,
    }
}
