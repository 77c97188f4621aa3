//! Data model: authoring-side filter groups and the settings wire shapes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::selector::TopologyKind;

/// Management zone as listed from the settings store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementZone {
    pub id: String,
    pub name: String,
}

/// One monitored entity resolved from the topology API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub entity_id: String,
    pub entity_type: String,
    pub display_name: String,
}

impl EntityReference {
    pub fn new(entity_id: &str, entity_type: &str, display_name: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            entity_type: entity_type.to_string(),
            display_name: display_name.to_string(),
        }
    }

    /// Topology variant of this entity's type
    pub fn kind(&self) -> TopologyKind {
        TopologyKind::from_entity_type(&self.entity_type)
    }
}

/// Topology inclusion flags of a filter group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlyingOptions {
    pub include_processes: bool,
    pub include_services: bool,
    pub include_hosts: bool,
    pub include_process_groups: bool,
}

/// A single underlying-inclusion flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnderlyingOption {
    Processes,
    Services,
    Hosts,
    ProcessGroups,
}

impl UnderlyingOption {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processes => "Include its processes",
            Self::Services => "Include its services",
            Self::Hosts => "Include its hosts",
            Self::ProcessGroups => "Include its process groups",
        }
    }
}

impl UnderlyingOptions {
    pub fn get(&self, option: UnderlyingOption) -> bool {
        match option {
            UnderlyingOption::Processes => self.include_processes,
            UnderlyingOption::Services => self.include_services,
            UnderlyingOption::Hosts => self.include_hosts,
            UnderlyingOption::ProcessGroups => self.include_process_groups,
        }
    }

    pub fn with(mut self, option: UnderlyingOption, value: bool) -> Self {
        match option {
            UnderlyingOption::Processes => self.include_processes = value,
            UnderlyingOption::Services => self.include_services = value,
            UnderlyingOption::Hosts => self.include_hosts = value,
            UnderlyingOption::ProcessGroups => self.include_process_groups = value,
        }
        self
    }

    /// Copy with every flag the given kind does not offer cleared
    pub fn masked_for(&self, kind: TopologyKind) -> Self {
        let applicable = kind.applicable_options();
        let keep = |option: UnderlyingOption| self.get(option) && applicable.contains(&option);
        Self {
            include_processes: keep(UnderlyingOption::Processes),
            include_services: keep(UnderlyingOption::Services),
            include_hosts: keep(UnderlyingOption::Hosts),
            include_process_groups: keep(UnderlyingOption::ProcessGroups),
        }
    }
}

/// Tag condition of a filter group, `key` or `key:value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpec {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl TagSpec {
    /// Build from raw input; the key is trimmed and must not be empty, an
    /// empty value counts as absent.
    pub fn new(key: &str, value: Option<&str>) -> crate::Result<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(crate::Error::InvalidTag("tag key cannot be empty".to_string()));
        }

        let value = value.map(str::trim).filter(|v| !v.is_empty()).map(String::from);

        Ok(Self {
            key: key.to_string(),
            value,
        })
    }
}

impl fmt::Display for TagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}:{}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

impl FromStr for TagSpec {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.split_once(':') {
            Some((key, value)) => Self::new(key, Some(value)),
            None => Self::new(s, None),
        }
    }
}

/// One conjunctive scoping rule authored in the create session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilter {
    pub id: String,
    pub management_zones: Vec<ManagementZone>,
    pub tags: Vec<TagSpec>,
    pub entities: Vec<EntityReference>,
    pub underlying_options: UnderlyingOptions,
}

impl EntityFilter {
    pub fn new() -> Self {
        Self {
            id: generate_filter_id(),
            management_zones: Vec::new(),
            tags: Vec::new(),
            entities: Vec::new(),
            underlying_options: UnderlyingOptions::default(),
        }
    }

    /// A filter with no zone, tag or entity would match the whole environment
    pub fn is_empty(&self) -> bool {
        self.management_zones.is_empty() && self.tags.is_empty() && self.entities.is_empty()
    }

    /// Kind of the first entity; it decides which underlying options are offered
    pub fn primary_kind(&self) -> Option<TopologyKind> {
        self.entities.first().map(EntityReference::kind)
    }
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a unique filter group id
pub fn generate_filter_id() -> String {
    format!("filter-{}", uuid::Uuid::new_v4().simple())
}

/// Alert suppression level of a maintenance window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuppressionLevel {
    #[default]
    DetectProblemsAndAlert,
    DetectProblemsDontAlert,
    DontDetectProblems,
}

impl SuppressionLevel {
    pub const ALL: [SuppressionLevel; 3] = [
        Self::DetectProblemsAndAlert,
        Self::DetectProblemsDontAlert,
        Self::DontDetectProblems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetectProblemsAndAlert => "DETECT_PROBLEMS_AND_ALERT",
            Self::DetectProblemsDontAlert => "DETECT_PROBLEMS_DONT_ALERT",
            Self::DontDetectProblems => "DONT_DETECT_PROBLEMS",
        }
    }
}

impl fmt::Display for SuppressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuppressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown suppression level: {}", s))
    }
}

/// Everything the operator enters in the create form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDraft {
    pub name: String,
    pub description: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: String,
    pub suppression: SuppressionLevel,
    pub disable_synthetics: bool,
    pub filters: Vec<EntityFilter>,
}

impl WindowDraft {
    pub fn new(timezone: &str) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            start: None,
            end: None,
            timezone: timezone.to_string(),
            suppression: SuppressionLevel::default(),
            disable_synthetics: false,
            filters: Vec::new(),
        }
    }
}

// ============================================================================
// Settings wire shapes
// ============================================================================

/// Single conjunctive scoping clause of a saved window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub entity_tags: Vec<String>,
    #[serde(default)]
    pub management_zones: Vec<String>,
}

/// One selector rule of an auto-tagging policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTagRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    pub enabled: bool,
    pub entity_selector: String,
    pub value_format: String,
    pub value_normalization: String,
}

/// Value of a `builtin:tags.auto-tagging` settings object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoTagValue {
    pub name: String,
    pub description: String,
    pub rules: Vec<AutoTagRule>,
}

/// Envelope of a settings object creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsObjectCreate<T> {
    pub schema_id: String,
    pub scope: String,
    pub value: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub maintenance_type: String,
    #[serde(default)]
    pub suppression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_synthetic_monitor_execution: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRange {
    #[serde(default)]
    pub schedule_start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_range: Option<RecurrenceRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRecurrence {
    #[serde(flatten)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_week_days: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecurrence {
    #[serde(flatten)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub schedule_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub once_recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_recurrence: Option<WeeklyRecurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_recurrence: Option<MonthlyRecurrence>,
}

impl Schedule {
    /// First recurrence block present, in once/daily/weekly/monthly order
    pub fn active_recurrence(&self) -> Option<&Recurrence> {
        self.once_recurrence
            .as_ref()
            .or(self.daily_recurrence.as_ref())
            .or(self.weekly_recurrence.as_ref().map(|w| &w.recurrence))
            .or(self.monthly_recurrence.as_ref().map(|m| &m.recurrence))
    }
}

/// Value of a `builtin:alerting.maintenance-window` settings object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowValue {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub general_properties: GeneralProperties,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub filters: Vec<ApiFilter>,
}

/// Maintenance window as returned by the settings store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowObject {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub value: MaintenanceWindowValue,
}
