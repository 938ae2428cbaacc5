use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use std::collections::BTreeMap;

/// Back-reference from a pod to the controller that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

impl OwnerRef {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodRecord {
    pub name: String,
    pub phase: Option<String>,
    pub host_ip: Option<String>,
    pub pod_ip: Option<String>,
    pub restart_count: i32,
    pub images: Vec<String>,
    #[serde(skip)]
    pub owners: Vec<OwnerRef>,
    /// Owning deployment, filled in by correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentRecord {
    pub name: String,
    /// Declared replica count; `None` when the deployment leaves it unset.
    pub replicas: Option<i32>,
    pub available_replicas: i32,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePortRecord {
    pub port: i32,
    #[serde(rename = "targetPort")]
    pub target_port: Option<IntOrString>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub cluster_ip: Option<String>,
    pub ports: Vec<ServicePortRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionIssue {
    pub deployment: String,
    pub detected_images: Vec<String>,
    pub issue: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamespaceReport {
    pub deployments: Vec<DeploymentRecord>,
    pub pods: Vec<PodRecord>,
    pub services: Vec<ServiceRecord>,
    pub version_issues: Vec<VersionIssue>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterReport {
    pub summary: String,
    pub data: BTreeMap<String, NamespaceReport>,
    /// Namespaces whose fetch failed, with the error text.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    /// Namespaces never fetched because the report was cancelled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

/// Per-namespace listing produced by the projection-only views.
#[derive(Debug, Clone, Serialize)]
pub struct NamespacedList<T> {
    pub data: BTreeMap<String, Vec<T>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl<T> Default for NamespacedList<T> {
    fn default() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }
}

/// Outcome of a custom-object query. Callers branch on the presence of `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CustomObjectResult {
    Found {
        summary: String,
        data: serde_json::Value,
    },
    Failed {
        error: String,
    },
}

impl CustomObjectResult {
    pub fn error(&self) -> Option<&str> {
        match self {
            CustomObjectResult::Found { .. } => None,
            CustomObjectResult::Failed { error } => Some(error),
        }
    }
}
