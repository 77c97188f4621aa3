//! Entity selector construction
//!
//! Topology expansion ("include its processes", "include its hosts", ...)
//! is expressed as a list of entity selectors, one per reachable entity
//! type. The selectors feed auto-tagging rules; the distinct entity types
//! become tag-matching filters of the maintenance window.

use serde::{Deserialize, Serialize};

use crate::model::{EntityReference, UnderlyingOption, UnderlyingOptions};

/// Entity types that offer topology expansion, everything else is `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyKind {
    Host,
    ProcessGroup,
    Service,
    Other,
}

impl TopologyKind {
    pub fn from_entity_type(entity_type: &str) -> Self {
        match entity_type {
            "HOST" => Self::Host,
            "PROCESS_GROUP" => Self::ProcessGroup,
            "SERVICE" => Self::Service,
            _ => Self::Other,
        }
    }

    /// Underlying options offered for this kind, in display order
    pub fn applicable_options(&self) -> &'static [UnderlyingOption] {
        match self {
            Self::Host => &[UnderlyingOption::Processes, UnderlyingOption::Services],
            Self::ProcessGroup => &[UnderlyingOption::Hosts, UnderlyingOption::Services],
            Self::Service => &[UnderlyingOption::Hosts, UnderlyingOption::ProcessGroups],
            Self::Other => &[],
        }
    }

    pub fn supports_underlying(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Selectors for related entities reached from `entity_id` by the given flags
    fn related_selectors(&self, entity_id: &str, options: &UnderlyingOptions) -> Vec<EntitySelector> {
        let id = quote(entity_id);
        let mut selectors = Vec::new();

        match self {
            Self::Host => {
                if options.include_processes {
                    selectors.push(EntitySelector::new(
                        "PROCESS_GROUP_INSTANCE",
                        format!("type(PROCESS_GROUP_INSTANCE),fromRelationships.isProcessOf(entityId({}))", id),
                    ));
                }
                if options.include_services {
                    selectors.push(EntitySelector::new(
                        "SERVICE_INSTANCE",
                        format!("type(SERVICE_INSTANCE),fromRelationships.runsOnHost(entityId({}))", id),
                    ));
                }
            }
            Self::ProcessGroup => {
                if options.include_hosts {
                    selectors.push(EntitySelector::new(
                        "HOST",
                        format!("type(HOST),toRelationships.runsOn(entityId({}))", id),
                    ));
                }
                if options.include_services {
                    selectors.push(EntitySelector::new(
                        "SERVICE",
                        format!("type(SERVICE),fromRelationships.runsOn(entityId({}))", id),
                    ));
                }
            }
            Self::Service => {
                if options.include_hosts {
                    selectors.push(EntitySelector::new(
                        "HOST",
                        format!("type(HOST),toRelationships.runsOnHost(entityId({}))", id),
                    ));
                }
                if options.include_process_groups {
                    selectors.push(EntitySelector::new(
                        "PROCESS_GROUP",
                        format!("type(PROCESS_GROUP),toRelationships.runsOn(entityId({}))", id),
                    ));
                }
            }
            Self::Other => {}
        }

        selectors
    }
}

/// Typed entity selector expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySelector {
    pub entity_type: String,
    pub selector: String,
}

impl EntitySelector {
    fn new(entity_type: &str, selector: String) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            selector,
        }
    }
}

/// Selectors reaching `entity` itself plus every related entity the options ask for.
///
/// The self selector always comes first. Types without a topology
/// expansion only ever yield the self selector.
pub fn build_entity_selectors_for_underlying(
    entity: &EntityReference,
    options: &UnderlyingOptions,
) -> Vec<EntitySelector> {
    let mut selectors = vec![EntitySelector::new(
        &entity.entity_type,
        format!("type({}),entityId({})", entity.entity_type, quote(&entity.entity_id)),
    )];

    selectors.extend(entity.kind().related_selectors(&entity.entity_id, options));
    selectors
}

/// True when any of the four inclusion flags is set
pub fn has_underlying_options_selected(options: &UnderlyingOptions) -> bool {
    options.include_processes
        || options.include_services
        || options.include_hosts
        || options.include_process_groups
}

/// Selector for interactive search by name substring
pub fn name_contains_selector(entity_type: &str, term: &str) -> String {
    format!("type({}),entityName.contains({})", quote(entity_type), quote(term))
}

/// Selector for an exact display name match
pub fn name_equals_selector(entity_type: &str, name: &str) -> String {
    format!("type({}),entityName.equals({})", quote(entity_type), quote(name))
}

/// Selector for an exact detected-name match
pub fn detected_name_equals_selector(entity_type: &str, name: &str) -> String {
    format!("type({}),detectedName.equals({})", quote(entity_type), quote(name))
}

/// Quote a selector string literal, escaping with `~`
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '~') {
            quoted.push('~');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
