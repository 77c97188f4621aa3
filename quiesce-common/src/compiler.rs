//! Filter compilation
//!
//! Turns the filter groups authored in a session into the settings payloads
//! the platform understands. A group scoped to plain entities, zones and
//! tags maps directly onto `ApiFilter`s. A group asking for topology
//! expansion cannot be expressed that way; instead an auto-tagging policy
//! tags every reachable entity and the window filters on that tag.

use regex::Regex;
use std::sync::LazyLock;

use crate::format::{stamp_description, to_api_date_time};
use crate::model::{
    ApiFilter, AutoTagRule, AutoTagValue, EntityFilter, EntityReference, GeneralProperties,
    MaintenanceWindowValue, Recurrence, Schedule, SettingsObjectCreate, UnderlyingOptions,
    WindowDraft,
};
use crate::selector::{build_entity_selectors_for_underlying, has_underlying_options_selected};
use crate::{AUTO_TAGGING_SCHEMA, ENVIRONMENT_SCOPE, MAINTENANCE_WINDOW_SCHEMA};

/// Value every auto-generated maintenance tag carries
pub const MAINTENANCE_TAG_VALUE: &str = "delete after expiration";

/// Prefix of auto-generated maintenance tag keys
pub const MAINTENANCE_TAG_PREFIX: &str = "Maintenance — ";

const RULE_TYPE_SELECTOR: &str = "SELECTOR";
const VALUE_NORMALIZATION: &str = "Leave text as-is";
const MAINTENANCE_TYPE_PLANNED: &str = "PLANNED";
const SCHEDULE_TYPE_ONCE: &str = "ONCE";

static TAG_NAME_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_\s\-—]").unwrap()
});

/// Strip everything but word characters, whitespace, hyphen and em-dash
pub fn sanitize_tag_name(name: &str) -> String {
    TAG_NAME_DISALLOWED.replace_all(name, "").trim().to_string()
}

/// Tag key used by the auto-tagging policy of a window
pub fn generate_maintenance_tag_key(window_name: &str) -> String {
    format!("{}{}", MAINTENANCE_TAG_PREFIX, sanitize_tag_name(window_name))
}

/// Whether this entity's scope can only be reached through an auto-tag
pub fn needs_auto_tagging(entity: &EntityReference, options: &UnderlyingOptions) -> bool {
    let kind = entity.kind();
    kind.supports_underlying() && has_underlying_options_selected(&options.masked_for(kind))
}

/// True when any entity of any group needs topology expansion
pub fn filters_require_auto_tagging(filters: &[EntityFilter]) -> bool {
    filters.iter().any(|filter| {
        filter
            .entities
            .iter()
            .any(|entity| needs_auto_tagging(entity, &filter.underlying_options))
    })
}

/// One selector rule per derived topology selector, all tagging with the same value
pub fn build_auto_tag_rules(filters: &[EntityFilter]) -> Vec<AutoTagRule> {
    let mut rules = Vec::new();

    for filter in filters {
        for entity in &filter.entities {
            if !needs_auto_tagging(entity, &filter.underlying_options) {
                continue;
            }

            let options = filter.underlying_options.masked_for(entity.kind());
            rules.extend(
                build_entity_selectors_for_underlying(entity, &options)
                    .into_iter()
                    .map(|selector| AutoTagRule {
                        rule_type: RULE_TYPE_SELECTOR.to_string(),
                        enabled: true,
                        entity_selector: selector.selector,
                        value_format: MAINTENANCE_TAG_VALUE.to_string(),
                        value_normalization: VALUE_NORMALIZATION.to_string(),
                    }),
            );
        }
    }

    rules
}

/// Auto-tagging work a draft requires before its window can be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoTagPlan {
    pub tag_key: String,
    pub rules: Vec<AutoTagRule>,
}

/// Decide whether the draft needs an auto-tag and, if so, which rules.
///
/// Yields `None` when no group asks for topology expansion, or when the
/// expansion produced no rules; in both cases the window is compiled without
/// tag rewriting.
pub fn plan_auto_tagging(draft: &WindowDraft) -> Option<AutoTagPlan> {
    if !filters_require_auto_tagging(&draft.filters) {
        return None;
    }

    let rules = build_auto_tag_rules(&draft.filters);
    if rules.is_empty() {
        return None;
    }

    Some(AutoTagPlan {
        tag_key: generate_maintenance_tag_key(draft.name.trim()),
        rules,
    })
}

/// Compile filter groups into the window's OR'd filter list.
///
/// `tag_key` is only honoured for entities that need auto-tagging; such an
/// entity yields one tag-matching filter per distinct entity type its
/// selectors reach instead of a filter on its own id.
pub fn compile_filters(filters: &[EntityFilter], tag_key: Option<&str>) -> Vec<ApiFilter> {
    let mut api_filters = Vec::new();

    for filter in filters {
        let base_tags: Vec<String> = filter.tags.iter().map(ToString::to_string).collect();
        let base_zones: Vec<String> = filter.management_zones.iter().map(|mz| mz.id.clone()).collect();

        if filter.entities.is_empty() {
            api_filters.push(ApiFilter {
                entity_type: None,
                entity_id: None,
                entity_tags: base_tags,
                management_zones: base_zones,
            });
            continue;
        }

        for entity in &filter.entities {
            match tag_key {
                Some(key) if needs_auto_tagging(entity, &filter.underlying_options) => {
                    let options = filter.underlying_options.masked_for(entity.kind());
                    let mut entity_types: Vec<String> = Vec::new();
                    for selector in build_entity_selectors_for_underlying(entity, &options) {
                        if !entity_types.contains(&selector.entity_type) {
                            entity_types.push(selector.entity_type);
                        }
                    }

                    let mut tags = base_tags.clone();
                    tags.push(format!("{}:{}", key, MAINTENANCE_TAG_VALUE));

                    for entity_type in entity_types {
                        let candidate = ApiFilter {
                            entity_type: Some(entity_type),
                            entity_id: None,
                            entity_tags: tags.clone(),
                            management_zones: base_zones.clone(),
                        };
                        // entities of one group reaching the same type share a filter
                        if !api_filters.contains(&candidate) {
                            api_filters.push(candidate);
                        }
                    }
                }
                _ => api_filters.push(ApiFilter {
                    entity_type: Some(entity.entity_type.clone()),
                    entity_id: Some(entity.entity_id.clone()),
                    entity_tags: base_tags.clone(),
                    management_zones: base_zones.clone(),
                }),
            }
        }
    }

    api_filters
}

/// Build the maintenance-window settings object for a validated draft
pub fn build_payload(
    draft: &WindowDraft,
    author_email: &str,
    tag_key: Option<&str>,
) -> SettingsObjectCreate<MaintenanceWindowValue> {
    let start = draft.start.as_deref().unwrap_or_default();
    let end = draft.end.as_deref().unwrap_or_default();

    SettingsObjectCreate {
        schema_id: MAINTENANCE_WINDOW_SCHEMA.to_string(),
        scope: ENVIRONMENT_SCOPE.to_string(),
        value: MaintenanceWindowValue {
            enabled: true,
            general_properties: GeneralProperties {
                name: Some(draft.name.trim().to_string()),
                description: Some(stamp_description(&draft.description, author_email)),
                maintenance_type: MAINTENANCE_TYPE_PLANNED.to_string(),
                suppression: draft.suppression.as_str().to_string(),
                disable_synthetic_monitor_execution: Some(draft.disable_synthetics),
            },
            schedule: Schedule {
                schedule_type: SCHEDULE_TYPE_ONCE.to_string(),
                once_recurrence: Some(Recurrence {
                    start_time: to_api_date_time(start),
                    end_time: to_api_date_time(end),
                    time_zone: draft.timezone.clone(),
                    recurrence_range: None,
                }),
                ..Default::default()
            },
            filters: compile_filters(&draft.filters, tag_key),
        },
    }
}

/// Build the auto-tagging settings object carrying the given rules
pub fn build_auto_tag_payload(
    tag_name: &str,
    tag_value: &str,
    rules: Vec<AutoTagRule>,
) -> SettingsObjectCreate<AutoTagValue> {
    SettingsObjectCreate {
        schema_id: AUTO_TAGGING_SCHEMA.to_string(),
        scope: ENVIRONMENT_SCOPE.to_string(),
        value: AutoTagValue {
            name: tag_name.to_string(),
            description: format!(
                "Auto-generated tag for maintenance window. Value: {}. This tag can be safely deleted after the maintenance window expires.",
                tag_value
            ),
            rules,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ManagementZone, TagSpec};

    fn group(entities: Vec<EntityReference>, options: UnderlyingOptions) -> EntityFilter {
        EntityFilter {
            entities,
            underlying_options: options,
            ..EntityFilter::new()
        }
    }

    fn host(id: &str) -> EntityReference {
        EntityReference::new(id, "HOST", id)
    }

    fn services_only() -> UnderlyingOptions {
        UnderlyingOptions {
            include_services: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_sanitize_tag_name() {
        assert_eq!(sanitize_tag_name("  DB upgrade (phase #2)! "), "DB upgrade phase 2");
        assert_eq!(sanitize_tag_name("core—net_01"), "core—net_01");
        assert_eq!(generate_maintenance_tag_key("DB upgrade"), "Maintenance — DB upgrade");
    }

    #[test]
    fn test_no_options_means_no_rules_and_direct_filters() {
        for entity_type in ["HOST", "PROCESS_GROUP", "SERVICE"] {
            let entity = EntityReference::new("E-1", entity_type, "thing");
            let filters = vec![group(vec![entity], UnderlyingOptions::default())];

            assert!(!filters_require_auto_tagging(&filters));
            assert!(build_auto_tag_rules(&filters).is_empty());

            for tag_key in [None, Some("Maintenance — x")] {
                let compiled = compile_filters(&filters, tag_key);
                assert_eq!(compiled.len(), 1);
                assert_eq!(compiled[0].entity_id.as_deref(), Some("E-1"));
                assert_eq!(compiled[0].entity_type.as_deref(), Some(entity_type));
            }
        }
    }

    #[test]
    fn test_other_types_never_need_auto_tagging() {
        let app = EntityReference::new("APPLICATION-1", "APPLICATION", "shop");
        let all = UnderlyingOptions {
            include_processes: true,
            include_services: true,
            include_hosts: true,
            include_process_groups: true,
        };
        let filters = vec![group(vec![app], all)];
        assert!(!filters_require_auto_tagging(&filters));
        assert!(build_auto_tag_rules(&filters).is_empty());
    }

    #[test]
    fn test_rules_per_selector() {
        let filters = vec![group(vec![host("HOST-1")], services_only())];
        let rules = build_auto_tag_rules(&filters);

        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|rule| rule.rule_type == "SELECTOR" && rule.enabled));
        assert!(rules.iter().all(|rule| rule.value_format == MAINTENANCE_TAG_VALUE));
        assert_eq!(rules[0].entity_selector, r#"type(HOST),entityId("HOST-1")"#);
        assert!(rules[1].entity_selector.contains("runsOnHost"));
    }

    #[test]
    fn test_distinct_types_per_group() {
        let filters = vec![group(vec![host("HOST-1"), host("HOST-2")], services_only())];
        let compiled = compile_filters(&filters, Some("Maintenance — w"));

        let types: Vec<&str> = compiled
            .iter()
            .map(|f| f.entity_type.as_deref().unwrap())
            .collect();
        assert_eq!(types, vec!["HOST", "SERVICE_INSTANCE"]);
        assert!(compiled.iter().all(|f| f.entity_id.is_none()));
        assert!(compiled
            .iter()
            .all(|f| f.entity_tags == vec!["Maintenance — w:delete after expiration"]));
    }

    #[test]
    fn test_only_tag_filters_are_deduplicated() {
        let direct = vec![
            group(vec![host("HOST-1"), host("HOST-1")], UnderlyingOptions::default()),
            EntityFilter::new(),
            EntityFilter::new(),
        ];
        assert_eq!(compile_filters(&direct, None).len(), 4);

        let tagged = vec![
            group(vec![host("HOST-1")], services_only()),
            group(vec![host("HOST-2")], services_only()),
        ];
        assert_eq!(compile_filters(&tagged, Some("Maintenance — w")).len(), 2);
    }

    #[test]
    fn test_base_tags_and_zones_carried() {
        let mut filter = group(vec![host("HOST-1")], services_only());
        filter.tags = vec![
            TagSpec::new("env", Some("prod")).unwrap(),
            TagSpec::new("critical", None).unwrap(),
        ];
        filter.management_zones = vec![ManagementZone {
            id: "mz-1".to_string(),
            name: "Payments".to_string(),
        }];

        let tagged = compile_filters(std::slice::from_ref(&filter), Some("K"));
        assert_eq!(
            tagged[0].entity_tags,
            vec!["env:prod", "critical", "K:delete after expiration"]
        );
        assert_eq!(tagged[0].management_zones, vec!["mz-1"]);

        let direct = compile_filters(&[filter], None);
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].entity_tags, vec!["env:prod", "critical"]);
        assert_eq!(direct[0].entity_id.as_deref(), Some("HOST-1"));
    }

    #[test]
    fn test_zone_only_group() {
        let mut filter = EntityFilter::new();
        filter.management_zones.push(ManagementZone {
            id: "mz-9".to_string(),
            name: "Edge".to_string(),
        });

        let compiled = compile_filters(&[filter], Some("ignored"));
        assert_eq!(
            compiled,
            vec![ApiFilter {
                entity_type: None,
                entity_id: None,
                entity_tags: vec![],
                management_zones: vec!["mz-9".to_string()],
            }]
        );
    }

    #[test]
    fn test_mixed_group_only_rewrites_qualifying_entities() {
        let app = EntityReference::new("APPLICATION-1", "APPLICATION", "shop");
        let filters = vec![group(vec![host("HOST-1"), app], services_only())];
        let compiled = compile_filters(&filters, Some("K"));

        assert_eq!(compiled.len(), 3);
        assert_eq!(compiled[2].entity_id.as_deref(), Some("APPLICATION-1"));
        assert!(compiled[2].entity_tags.is_empty());
    }

    #[test]
    fn test_plan_auto_tagging() {
        let mut draft = WindowDraft::new("UTC");
        draft.name = " DB upgrade ".to_string();
        draft.filters = vec![group(vec![host("HOST-1")], UnderlyingOptions::default())];
        assert!(plan_auto_tagging(&draft).is_none());

        draft.filters = vec![group(vec![host("HOST-1")], services_only())];
        let plan = plan_auto_tagging(&draft).unwrap();
        assert_eq!(plan.tag_key, "Maintenance — DB upgrade");
        assert_eq!(plan.rules.len(), 2);
    }

    #[test]
    fn test_build_payload() {
        let mut draft = WindowDraft::new("Europe/Paris");
        draft.name = "  Network swap ".to_string();
        draft.description = "Core switch".to_string();
        draft.start = Some("2024-05-01 22:00".to_string());
        draft.end = Some("2024-05-02T01:30:00".to_string());
        draft.disable_synthetics = true;
        draft.filters = vec![group(vec![host("HOST-1")], UnderlyingOptions::default())];

        let payload = build_payload(&draft, "ops@example.com", None);
        assert_eq!(payload.schema_id, "builtin:alerting.maintenance-window");
        assert_eq!(payload.scope, "environment");

        let json = serde_json::to_value(&payload).unwrap();
        let value = &json["value"];
        assert_eq!(value["enabled"], true);
        assert_eq!(value["generalProperties"]["name"], "Network swap");
        assert_eq!(value["generalProperties"]["description"], "Core switch [ops@example.com]");
        assert_eq!(value["generalProperties"]["maintenanceType"], "PLANNED");
        assert_eq!(value["generalProperties"]["suppression"], "DETECT_PROBLEMS_AND_ALERT");
        assert_eq!(value["generalProperties"]["disableSyntheticMonitorExecution"], true);
        assert_eq!(value["schedule"]["scheduleType"], "ONCE");
        assert_eq!(value["schedule"]["onceRecurrence"]["startTime"], "2024-05-01T22:00:00");
        assert_eq!(value["schedule"]["onceRecurrence"]["endTime"], "2024-05-02T01:30:00");
        assert_eq!(value["schedule"]["onceRecurrence"]["timeZone"], "Europe/Paris");
        assert!(value["schedule"].get("dailyRecurrence").is_none());
        assert_eq!(value["filters"][0]["entityId"], "HOST-1");
    }

    #[test]
    fn test_build_auto_tag_payload() {
        let rules = build_auto_tag_rules(&[group(vec![host("HOST-1")], services_only())]);
        let payload = build_auto_tag_payload("Maintenance — x", MAINTENANCE_TAG_VALUE, rules);

        assert_eq!(payload.schema_id, "builtin:tags.auto-tagging");
        assert_eq!(payload.value.name, "Maintenance — x");
        assert!(payload.value.description.contains("delete after expiration"));
        assert!(payload.value.description.contains("safely deleted"));
        assert_eq!(payload.value.rules.len(), 2);
    }
}
