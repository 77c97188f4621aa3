//! Bulk host input
//!
//! Operators paste a list of host names; each name that resolves becomes its
//! own filter group carrying the shared zones, tags and inclusion flags.
//! Resolution itself needs the entity API and lives in the client crate.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::model::{EntityFilter, EntityReference, ManagementZone, TagSpec, UnderlyingOptions};
use crate::{Error, Result};

/// Entity type every bulk-added entity has
pub const HOST_ENTITY_TYPE: &str = "HOST";

static HOST_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// Split pasted text into host names, duplicates removed, first occurrence kept
pub fn parse_hosts_list(input: &str) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();

    for host in HOST_SEPARATOR.split(input).map(str::trim).filter(|h| !h.is_empty()) {
        if !hosts.iter().any(|h| h == host) {
            hosts.push(host.to_string());
        }
    }

    hosts
}

/// Host reference built from an entity-search hit; missing fields fall back
/// to the entity id, then to the type name
pub fn host_reference(entity_id: Option<&str>, display_name: Option<&str>) -> EntityReference {
    let id = entity_id.unwrap_or(HOST_ENTITY_TYPE);
    EntityReference::new(id, HOST_ENTITY_TYPE, display_name.unwrap_or(id))
}

/// Shared settings applied to every host of a bulk add
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkHostsDraft {
    pub input: String,
    pub management_zones: Vec<ManagementZone>,
    pub tags: Vec<TagSpec>,
    pub include_processes: bool,
    pub include_services: bool,
}

impl BulkHostsDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host names in the pasted input; empty input is an error
    pub fn host_names(&self) -> Result<Vec<String>> {
        let hosts = parse_hosts_list(&self.input);
        if hosts.is_empty() {
            return Err(Error::EmptyHostList);
        }
        Ok(hosts)
    }

    /// Inclusion flags of the generated groups; host-side flags only
    pub fn underlying_options(&self) -> UnderlyingOptions {
        UnderlyingOptions {
            include_processes: self.include_processes,
            include_services: self.include_services,
            include_hosts: false,
            include_process_groups: false,
        }
    }

    /// One filter group per host, each with a fresh id
    pub fn materialize_filters(&self, hosts: &[EntityReference]) -> Vec<EntityFilter> {
        hosts
            .iter()
            .map(|host| EntityFilter {
                management_zones: self.management_zones.clone(),
                tags: self.tags.clone(),
                entities: vec![host.clone()],
                underlying_options: self.underlying_options(),
                ..EntityFilter::new()
            })
            .collect()
    }
}

/// Outcome of resolving every pasted name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostResolution {
    pub resolved: Vec<EntityReference>,
    pub unresolved: Vec<String>,
}

impl HostResolution {
    /// Filter groups for the resolved hosts, all-or-nothing
    pub fn into_filters(self, draft: &BulkHostsDraft) -> Result<Vec<EntityFilter>> {
        if !self.unresolved.is_empty() {
            return Err(Error::UnresolvedHosts(self.unresolved));
        }
        Ok(draft.materialize_filters(&self.resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hosts_list() {
        assert_eq!(parse_hosts_list("web-01, web-01,  web-02"), vec!["web-01", "web-02"]);
        assert_eq!(
            parse_hosts_list("db-01\n\tdb-02,,cache  db-01\r\n"),
            vec!["db-01", "db-02", "cache"]
        );
        assert!(parse_hosts_list(" ,\n ").is_empty());
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(parse_hosts_list("Web web"), vec!["Web", "web"]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let draft = BulkHostsDraft {
            input: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(draft.host_names(), Err(Error::EmptyHostList)));
    }

    #[test]
    fn test_host_reference_fallbacks() {
        let host = host_reference(Some("HOST-1"), None);
        assert_eq!(host.display_name, "HOST-1");
        assert_eq!(host.entity_type, "HOST");

        let bare = host_reference(None, None);
        assert_eq!(bare.entity_id, "HOST");
        assert_eq!(bare.display_name, "HOST");
    }

    #[test]
    fn test_materialize_filters() {
        let draft = BulkHostsDraft {
            input: "web-01 web-02".to_string(),
            management_zones: vec![ManagementZone {
                id: "mz-1".to_string(),
                name: "Web".to_string(),
            }],
            tags: vec![TagSpec::new("env", Some("prod")).unwrap()],
            include_processes: true,
            include_services: false,
        };
        let hosts = vec![
            EntityReference::new("HOST-1", "HOST", "web-01"),
            EntityReference::new("HOST-2", "HOST", "web-02"),
        ];

        let filters = draft.materialize_filters(&hosts);
        assert_eq!(filters.len(), 2);
        assert_ne!(filters[0].id, filters[1].id);
        for (filter, host) in filters.iter().zip(&hosts) {
            assert_eq!(filter.entities, vec![host.clone()]);
            assert_eq!(filter.management_zones.len(), 1);
            assert_eq!(filter.tags[0].to_string(), "env:prod");
            assert!(filter.underlying_options.include_processes);
            assert!(!filter.underlying_options.include_hosts);
        }
    }

    #[test]
    fn test_unresolved_hosts_add_nothing() {
        let resolution = HostResolution {
            resolved: vec![EntityReference::new("HOST-1", "HOST", "web-01")],
            unresolved: vec!["web-02".to_string(), "web-03".to_string()],
        };

        let err = resolution.into_filters(&BulkHostsDraft::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find the following hosts: web-02, web-03"
        );
    }
}
