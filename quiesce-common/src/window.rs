//! Window listing and detail view models

use crate::entity_types::{entity_type_label, EntityTypeOption};
use crate::format::{
    format_date_time, format_timestamp, format_week_days, maintenance_type_label,
    parse_description, schedule_type_label, suppression_description, UNKNOWN_AUTHOR,
};
use crate::model::{ManagementZone, MaintenanceWindowObject};
use crate::timezone::{timezone_city, timezone_offset, DEFAULT_TIMEZONE};
use crate::MAINTENANCE_WINDOW_SCHEMA;
use serde::Serialize;
use std::collections::HashMap;

/// Client-side page size of the window list
pub const PAGE_SIZE: usize = 500;

/// Shown instead of filter cards when a window has none
pub const NO_FILTERS_MESSAGE: &str = "No filters defined. Applies to entire environment.";

const SUPPORT_USER_PREFIX: &str = "Dynatrace support user";
const EMPTY_FIELD: &str = "—";

/// Flattened, display-ready view of a saved window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowSummary {
    pub object_id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub enabled: bool,
    pub suppression: String,
    pub schedule_type: String,
    pub start_time: String,
    pub end_time: String,
    pub utc_offset: String,
    pub city: String,
    #[serde(skip)]
    pub raw: MaintenanceWindowObject,
}

impl MaintenanceWindowSummary {
    pub fn from_object(object: MaintenanceWindowObject) -> Self {
        let value = &object.value;
        let props = &value.general_properties;
        let parsed = parse_description(props.description.as_deref().unwrap_or_default());
        let recurrence = value.schedule.active_recurrence();
        let tz_id = recurrence.map(|r| r.time_zone.as_str()).unwrap_or_default();
        let name = props.name.clone().unwrap_or_else(|| "Unnamed".to_string());

        Self {
            object_id: object.object_id.clone(),
            name: if value.enabled { name } else { format!("[Disabled] {}", name) },
            description: parsed.text,
            author: parsed.author,
            enabled: value.enabled,
            suppression: props.suppression.clone(),
            schedule_type: value.schedule.schedule_type.clone(),
            start_time: format_date_time(recurrence.map(|r| r.start_time.as_str()).unwrap_or_default()),
            end_time: format_date_time(recurrence.map(|r| r.end_time.as_str()).unwrap_or_default()),
            utc_offset: timezone_offset(tz_id).to_string(),
            city: timezone_city(tz_id).to_string(),
            raw: object,
        }
    }
}

/// Summarise raw settings objects in order
pub fn transform_api_items(items: Vec<MaintenanceWindowObject>) -> Vec<MaintenanceWindowSummary> {
    items.into_iter().map(MaintenanceWindowSummary::from_object).collect()
}

/// Visible windows: disabled ones only on request, name matched case-insensitively
pub fn filter_windows<'a>(
    windows: &'a [MaintenanceWindowSummary],
    show_disabled: bool,
    search: &str,
) -> Vec<&'a MaintenanceWindowSummary> {
    let needle = search.trim().to_lowercase();

    windows
        .iter()
        .filter(|w| show_disabled || w.enabled)
        .filter(|w| needle.is_empty() || w.name.to_lowercase().contains(&needle))
        .collect()
}

/// Number of pages for `total` items, never less than one
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE).max(1)
}

/// Zero-based page of a list; out-of-range pages are empty
pub fn page<T>(items: &[T], index: usize) -> &[T] {
    let start = index.saturating_mul(PAGE_SIZE).min(items.len());
    let end = start.saturating_add(PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Sort zones by name for selection lists
pub fn sort_zones(mut zones: Vec<ManagementZone>) -> Vec<ManagementZone> {
    zones.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    zones
}

/// Author to display, preferring the description stamp over a support-user account
pub fn display_author(raw_author: Option<&str>, description_author: &str) -> String {
    let raw_author = raw_author.unwrap_or_default();

    if raw_author.starts_with(SUPPORT_USER_PREFIX) {
        return if description_author != UNKNOWN_AUTHOR {
            description_author.to_string()
        } else {
            raw_author.to_string()
        };
    }

    [raw_author, description_author]
        .into_iter()
        .find(|author| !author.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string()
}

/// Labelled value of the detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

impl DetailField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label,
            value: if value.is_empty() { EMPTY_FIELD.to_string() } else { value },
        }
    }
}

/// One saved filter, resolved for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCard {
    pub management_zones: Vec<String>,
    pub tags: Vec<String>,
    pub entity: Option<String>,
    pub entity_type: Option<String>,
}

/// Everything the detail view shows, section by section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDetails {
    pub general: Vec<DetailField>,
    pub schedule: Vec<DetailField>,
    pub filters: Vec<FilterCard>,
    pub api: Vec<DetailField>,
}

impl WindowDetails {
    pub fn build(
        window: &MaintenanceWindowSummary,
        zones: &[ManagementZone],
        entity_types: &[EntityTypeOption],
    ) -> Self {
        let raw = &window.raw;
        let props = &raw.value.general_properties;
        let schedule = &raw.value.schedule;
        let recurrence = schedule.active_recurrence();
        let tz_id = recurrence
            .map(|r| r.time_zone.as_str())
            .filter(|tz| !tz.is_empty())
            .unwrap_or(DEFAULT_TIMEZONE);

        let general = vec![
            DetailField::new("Name", props.name.clone().unwrap_or_default()),
            DetailField::new("Description", window.description.clone()),
            DetailField::new("Maintenance type", maintenance_type_label(&props.maintenance_type)),
            DetailField::new("Suppression", suppression_description(&props.suppression)),
            DetailField::new(
                "Disable synthetics",
                if props.disable_synthetic_monitor_execution.unwrap_or(false) { "Yes" } else { "No" },
            ),
            DetailField::new("Author", display_author(raw.author.as_deref(), &window.author)),
            DetailField::new("Created", format_timestamp(raw.created)),
            DetailField::new("Last modified", format_timestamp(raw.modified)),
            DetailField::new("Status", if window.enabled { "Enabled" } else { "Disabled" }),
        ];

        let mut schedule_fields = vec![
            DetailField::new("Recurrence", schedule_type_label(&schedule.schedule_type)),
            DetailField::new(
                "Start time",
                format_date_time(recurrence.map(|r| r.start_time.as_str()).unwrap_or_default()),
            ),
            DetailField::new(
                "End time",
                format_date_time(recurrence.map(|r| r.end_time.as_str()).unwrap_or_default()),
            ),
            DetailField::new("Timezone", format!("UTC {}", timezone_offset(tz_id))),
            DetailField::new("Region", timezone_city(tz_id)),
        ];

        match schedule.schedule_type.as_str() {
            "WEEKLY" => {
                if let Some(weekly) = &schedule.weekly_recurrence {
                    schedule_fields.push(DetailField::new(
                        "Repeats on",
                        format_week_days(&weekly.selected_week_days),
                    ));
                }
            }
            "MONTHLY" => {
                if let Some(day) = schedule.monthly_recurrence.as_ref().and_then(|m| m.day_of_month) {
                    schedule_fields.push(DetailField::new("Day of month", day.to_string()));
                }
            }
            _ => {}
        }

        if let Some(range) = recurrence.and_then(|r| r.recurrence_range.as_ref()) {
            schedule_fields.push(DetailField::new("Schedule starts", range.schedule_start_date.clone()));
            schedule_fields.push(DetailField::new(
                "Schedule ends",
                range.schedule_end_date.clone().unwrap_or_else(|| "Never".to_string()),
            ));
        }

        let zone_names: HashMap<&str, &str> =
            zones.iter().map(|mz| (mz.id.as_str(), mz.name.as_str())).collect();

        let filters = raw
            .value
            .filters
            .iter()
            .map(|filter| FilterCard {
                management_zones: filter
                    .management_zones
                    .iter()
                    .map(|id| zone_names.get(id.as_str()).copied().unwrap_or(id.as_str()).to_string())
                    .collect(),
                tags: filter.entity_tags.clone(),
                entity: filter.entity_id.clone(),
                entity_type: match (&filter.entity_type, &filter.entity_id) {
                    (Some(entity_type), None) => {
                        Some(entity_type_label(entity_type, entity_types).to_string())
                    }
                    _ => None,
                },
            })
            .collect();

        let mut api = Vec::new();
        if let Some(created_by) = &raw.created_by {
            api.push(DetailField::new("Author UUID", created_by.clone()));
        }
        if let Some(modified_by) = &raw.modified_by {
            api.push(DetailField::new("Last modifier UUID", modified_by.clone()));
        }
        api.push(DetailField::new("Timezone ID", tz_id));
        api.push(DetailField::new("Schema ID", MAINTENANCE_WINDOW_SCHEMA));
        if let Some(version) = &raw.schema_version {
            api.push(DetailField::new("Schema version", version.clone()));
        }
        api.push(DetailField::new("Object ID", window.object_id.clone()));

        Self {
            general,
            schedule: schedule_fields,
            filters,
            api,
        }
    }
}
