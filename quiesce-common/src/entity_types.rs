//! Entity-type catalogue and label lookup

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Selectable entity type with its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeOption {
    pub value: String,
    pub label: String,
}

impl EntityTypeOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    /// Option for a listed type, deriving a label when the platform gives none
    pub fn from_listed(value: &str, display_name: Option<&str>) -> Self {
        match display_name.filter(|name| !name.is_empty()) {
            Some(label) => Self::new(value, label),
            None => Self::new(value, &humanize_entity_type(value)),
        }
    }
}

/// Type picked from the quick list; `Other` opens the full catalogue search
pub const QUICK_ENTITY_TYPES: &[(&str, &str)] = &[
    ("HOST", "Host"),
    ("HOST_GROUP", "Host Group"),
    ("PROCESS_GROUP", "Process Group"),
    ("SERVICE", "Service"),
    ("APPLICATION", "Application"),
    ("OTHER", "Other"),
];

const BUILTIN_ENTITY_TYPES: &[(&str, &str)] = &[
    ("APPLICATION", "Application"),
    ("APPLICATION_METHOD", "Application Method"),
    ("APPLICATION_METHOD_GROUP", "Application Method Group"),
    ("AUTO_SCALING_GROUP", "Auto Scaling Group"),
    ("AUXILIARY_SYNTHETIC_TEST", "Auxiliary Synthetic Test"),
    ("AWS_APPLICATION_LOAD_BALANCER", "AWS Application Load Balancer"),
    ("AWS_AVAILABILITY_ZONE", "AWS Availability Zone"),
    ("AWS_CREDENTIALS", "AWS Credentials"),
    ("AWS_LAMBDA_FUNCTION", "AWS Lambda Function"),
    ("AWS_NETWORK_LOAD_BALANCER", "AWS Network Load Balancer"),
    ("AZURE_API_MANAGEMENT_SERVICE", "Azure API Management Service"),
    ("AZURE_APPLICATION_GATEWAY", "Azure Application Gateway"),
    ("AZURE_COSMOS_DB", "Azure Cosmos DB"),
    ("AZURE_CREDENTIALS", "Azure Credentials"),
    ("AZURE_EVENT_HUB", "Azure Event Hub"),
    ("AZURE_EVENT_HUB_NAMESPACE", "Azure Event Hub Namespace"),
    ("AZURE_FUNCTION_APP", "Azure Function App"),
    ("AZURE_IOT_HUB", "Azure IoT Hub"),
    ("AZURE_LOAD_BALANCER", "Azure Load Balancer"),
    ("AZURE_MGMT_GROUP", "Azure Management Group"),
    ("AZURE_REDIS_CACHE", "Azure Redis Cache"),
    ("AZURE_REGION", "Azure Region"),
    ("AZURE_SERVICE_BUS", "Azure Service Bus"),
    ("AZURE_SQL_DATABASE", "Azure SQL Database"),
    ("AZURE_SQL_ELASTIC_POOL", "Azure SQL Elastic Pool"),
    ("AZURE_SQL_SERVER", "Azure SQL Server"),
    ("AZURE_STORAGE_ACCOUNT", "Azure Storage Account"),
    ("AZURE_SUBSCRIPTION", "Azure Subscription"),
    ("AZURE_TENANT", "Azure Tenant"),
    ("AZURE_VM", "Azure VM"),
    ("AZURE_VM_SCALE_SET", "Azure VM Scale Set"),
    ("AZURE_WEB_APP", "Azure Web App"),
    ("BROWSER_MONITOR", "Browser Monitor"),
    ("CINDER_VOLUME", "Cinder Volume"),
    ("CLOUD_APPLICATION", "Cloud Application"),
    ("CLOUD_APPLICATION_INSTANCE", "Cloud Application Instance"),
    ("CLOUD_APPLICATION_NAMESPACE", "Cloud Application Namespace"),
    ("CONTAINER_GROUP", "Container Group"),
    ("CONTAINER_GROUP_INSTANCE", "Container Group Instance"),
    ("CUSTOM_APPLICATION", "Custom Application"),
    ("CUSTOM_DEVICE", "Custom Device"),
    ("CUSTOM_DEVICE_GROUP", "Custom Device Group"),
    ("DCRUM_APPLICATION", "DC RUM Application"),
    ("DCRUM_SERVICE", "DC RUM Service"),
    ("DCRUM_SERVICE_INSTANCE", "DC RUM Service Instance"),
    ("DEVICE_APPLICATION_METHOD", "Device Application Method"),
    ("DISK", "Disk"),
    ("DOCKER_CONTAINER_GROUP", "Docker Container Group"),
    ("DOCKER_CONTAINER_GROUP_INSTANCE", "Docker Container Group Instance"),
    ("DYNAMO_DB_TABLE", "DynamoDB Table"),
    ("EBS_VOLUME", "EBS Volume"),
    ("EC2_INSTANCE", "EC2 Instance"),
    ("ELASTIC_LOAD_BALANCER", "Elastic Load Balancer"),
    ("ENVIRONMENT", "Environment"),
    ("ESXI_HOST", "ESXi Host"),
    ("EXTERNAL_SYNTHETIC_TEST_STEP", "External Synthetic Test Step"),
    ("GCP_ZONE", "GCP Zone"),
    ("GEOLOCATION", "Geolocation"),
    ("GEOLOC_SITE", "Geolocation Site"),
    ("GOOGLE_COMPUTE_ENGINE", "Google Compute Engine"),
    ("HOST", "Host"),
    ("HOST_GROUP", "Host Group"),
    ("HTTP_CHECK", "HTTP Check"),
    ("HTTP_CHECK_STEP", "HTTP Check Step"),
    ("HYPERVISOR", "Hypervisor"),
    ("KUBERNETES_CLUSTER", "Kubernetes Cluster"),
    ("KUBERNETES_NODE", "Kubernetes Node"),
    ("KUBERNETES_SERVICE", "Kubernetes Service"),
    ("MOBILE_APPLICATION", "Mobile Application"),
    ("NETWORK_INTERFACE", "Network Interface"),
    ("NEUTRON_SUBNET", "Neutron Subnet"),
    ("OPENSTACK_PROJECT", "OpenStack Project"),
    ("OPENSTACK_REGION", "OpenStack Region"),
    ("OPENSTACK_VM", "OpenStack VM"),
    ("OS", "Operating System"),
    ("PROCESS_GROUP", "Process Group"),
    ("PROCESS_GROUP_INSTANCE", "Process Group Instance"),
    ("QUEUE", "Queue"),
    ("QUEUE_INSTANCE", "Queue Instance"),
    ("RELATIONAL_DATABASE_SERVICE", "Relational Database Service"),
    ("SERVICE", "Service"),
    ("SERVICE_INSTANCE", "Service Instance"),
    ("SERVICE_METHOD", "Service Method"),
    ("SERVICE_METHOD_GROUP", "Service Method Group"),
    ("SWIFT_CONTAINER", "Swift Container"),
    ("SYNTHETIC_LOCATION", "Synthetic Location"),
    ("SYNTHETIC_TEST", "Synthetic Test"),
    ("SYNTHETIC_TEST_STEP", "Synthetic Test Step"),
    ("VIRTUALMACHINE", "Virtual Machine"),
    ("VMWARE_DATACENTER", "VMware Datacenter"),
];

/// Built-in catalogue, used whenever the platform's type listing is unavailable
pub static DEFAULT_ENTITY_TYPES: LazyLock<Vec<EntityTypeOption>> = LazyLock::new(|| {
    let mut types: Vec<EntityTypeOption> = BUILTIN_ENTITY_TYPES
        .iter()
        .map(|(value, label)| EntityTypeOption::new(value, label))
        .collect();
    sort_by_label(&mut types);
    types
});

/// Sort options case-insensitively by label
pub fn sort_by_label(types: &mut [EntityTypeOption]) {
    types.sort_by_cached_key(|option| option.label.to_lowercase());
}

/// `HOST_GROUP` -> `HOST GROUP`, `custom_device` -> `Custom Device`
pub fn humanize_entity_type(value: &str) -> String {
    value
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Label for a type value, the value itself when unknown
pub fn entity_type_label<'a>(value: &'a str, types: &'a [EntityTypeOption]) -> &'a str {
    types
        .iter()
        .find(|option| option.value == value)
        .map_or(value, |option| option.label.as_str())
}

/// Case-insensitive search over labels and values
pub fn filter_entity_types<'a>(types: &'a [EntityTypeOption], term: &str) -> Vec<&'a EntityTypeOption> {
    if term.is_empty() {
        return types.iter().collect();
    }

    let term = term.to_lowercase();
    types
        .iter()
        .filter(|option| {
            option.label.to_lowercase().contains(&term) || option.value.to_lowercase().contains(&term)
        })
        .collect()
}
