//! Per-namespace fan-out and merge into cluster-wide results.

use crate::correlate::{attribute_pods, correlate_images, detect_drift, mismatch_message};
use crate::crd::{CrdRegistry, ResolvedCrd};
use crate::error::FetchError;
use crate::kubernetes::{ReplicaSetIndex, ResourceFetcher};
use crate::summarize::{summarize, summarize_generic};
use crate::types::{
    ClusterReport, CustomObjectResult, DeploymentRecord, NamespaceReport, NamespacedList,
    PodRecord, ServiceRecord,
};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const NO_MISMATCHES: &str = "✅ No version mismatches detected across deployments.";

/// Flips to `true` when the caller wants no further namespaces started.
pub type CancelSignal = watch::Receiver<bool>;

enum NamespaceOutcome {
    Done(String, NamespaceReport),
    Failed(String, FetchError),
    Skipped(String),
}

/// Fetch one namespace and run correlation and drift detection on it.
pub async fn inspect_namespace(
    fetcher: &dyn ResourceFetcher,
    namespace: &str,
) -> Result<NamespaceReport, FetchError> {
    let (resources, replica_sets) = tokio::join!(
        async {
            tokio::try_join!(
                fetcher.list_deployments(namespace),
                fetcher.list_pods(namespace),
                fetcher.list_services(namespace),
            )
        },
        fetcher.list_replica_set_owners(namespace),
    );
    let (deployments, mut pods, services) = resources?;

    let replica_sets = replica_sets.unwrap_or_else(|e| {
        warn!(
            "Could not list ReplicaSets in namespace {}: {}. Falling back to name-based ownership.",
            namespace, e
        );
        ReplicaSetIndex::new()
    });

    attribute_pods(&mut pods, &replica_sets);
    let images = correlate_images(&pods);
    let version_issues = detect_drift(&images);
    debug!(
        "Namespace {}: {} deployments, {} pods, {} services, {} version issues",
        namespace,
        deployments.len(),
        pods.len(),
        services.len(),
        version_issues.len()
    );

    Ok(NamespaceReport {
        deployments,
        pods,
        services,
        version_issues,
    })
}

pub struct Reporter<'a> {
    fetcher: &'a dyn ResourceFetcher,
    registry: &'a CrdRegistry,
    concurrency: usize,
}

impl<'a> Reporter<'a> {
    pub fn new(
        fetcher: &'a dyn ResourceFetcher,
        registry: &'a CrdRegistry,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            registry,
            concurrency: concurrency.max(1),
        }
    }

    async fn target_namespaces(&self, namespace: Option<&str>) -> Result<Vec<String>, FetchError> {
        match namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => Ok(vec![ns.to_string()]),
            None => {
                let namespaces = self.fetcher.list_namespaces().await?;
                info!("Inspecting {} namespaces", namespaces.len());
                Ok(namespaces)
            }
        }
    }

    /// Full correlated report. Namespace failures are recorded per namespace;
    /// only a failure to enumerate namespaces fails the whole call.
    pub async fn cluster_report(
        &self,
        namespace: Option<&str>,
        cancel: &CancelSignal,
    ) -> Result<ClusterReport, FetchError> {
        let namespaces = self.target_namespaces(namespace).await?;
        let fetcher = self.fetcher;

        let outcomes: Vec<NamespaceOutcome> = stream::iter(namespaces)
            .map(|ns| {
                let cancel = cancel.clone();
                async move {
                    let cancelled = *cancel.borrow();
                    if cancelled {
                        return NamespaceOutcome::Skipped(ns);
                    }
                    match inspect_namespace(fetcher, &ns).await {
                        Ok(report) => NamespaceOutcome::Done(ns, report),
                        Err(e) => NamespaceOutcome::Failed(ns, e),
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(merge_outcomes(outcomes))
    }

    pub async fn deployments(
        &self,
        namespace: Option<&str>,
    ) -> Result<NamespacedList<DeploymentRecord>, FetchError> {
        let fetcher = self.fetcher;
        self.list_view(namespace, |ns| async move {
            let result = fetcher.list_deployments(&ns).await;
            (ns, result)
        })
        .await
    }

    pub async fn pods(
        &self,
        namespace: Option<&str>,
    ) -> Result<NamespacedList<PodRecord>, FetchError> {
        let fetcher = self.fetcher;
        self.list_view(namespace, |ns| async move {
            let result = fetcher.list_pods(&ns).await;
            (ns, result)
        })
        .await
    }

    pub async fn services(
        &self,
        namespace: Option<&str>,
    ) -> Result<NamespacedList<ServiceRecord>, FetchError> {
        let fetcher = self.fetcher;
        self.list_view(namespace, |ns| async move {
            let result = fetcher.list_services(&ns).await;
            (ns, result)
        })
        .await
    }

    async fn list_view<T, F, Fut>(
        &self,
        namespace: Option<&str>,
        fetch: F,
    ) -> Result<NamespacedList<T>, FetchError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = (String, Result<Vec<T>, FetchError>)>,
    {
        let namespaces = self.target_namespaces(namespace).await?;
        let results: Vec<_> = stream::iter(namespaces)
            .map(fetch)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut view = NamespacedList::default();
        for (ns, result) in results {
            match result {
                Ok(items) => {
                    view.data.insert(ns, items);
                }
                Err(e) => {
                    warn!("Failed to list resources in namespace {}: {}", ns, e);
                    view.errors.insert(ns, e.to_string());
                }
            }
        }
        Ok(view)
    }

    /// Resolve the identifier, list the objects and summarize them. Errors
    /// come back as `CustomObjectResult::Failed`.
    pub async fn custom_objects(
        &self,
        identifier: &str,
        version: Option<&str>,
        plural: Option<&str>,
        namespace: Option<&str>,
    ) -> CustomObjectResult {
        let resolved = match self.registry.resolve(identifier, version, plural) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Cannot resolve custom resource '{}': {}", identifier, e);
                return CustomObjectResult::Failed {
                    error: e.to_string(),
                };
            }
        };
        if let ResolvedCrd::Known(descriptor) = &resolved {
            debug!("'{}' resolved to known kind {}", identifier, descriptor.key);
        }

        let namespace = namespace.filter(|ns| !ns.is_empty());
        let data = match self
            .fetcher
            .list_custom_objects(
                resolved.group(),
                resolved.version(),
                resolved.plural(),
                namespace,
            )
            .await
        {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Failed to list {}.{}/{}: {}",
                    resolved.plural(),
                    resolved.group(),
                    resolved.version(),
                    e
                );
                return CustomObjectResult::Failed {
                    error: e.to_string(),
                };
            }
        };

        let Some(items) = data.get("items").and_then(Value::as_array) else {
            let e = FetchError::Request(format!(
                "list response for {}.{} has no items array",
                resolved.plural(),
                resolved.group()
            ));
            warn!("{}", e);
            return CustomObjectResult::Failed {
                error: e.to_string(),
            };
        };
        let summary = match &resolved {
            ResolvedCrd::Known(descriptor) => summarize(descriptor.kind, items),
            ResolvedCrd::Generic { plural, .. } => summarize_generic(items, plural),
        };
        CustomObjectResult::Found { summary, data }
    }
}

/// Single-writer merge of per-namespace outcomes, in namespace order.
fn merge_outcomes(outcomes: Vec<NamespaceOutcome>) -> ClusterReport {
    let mut report = ClusterReport::default();
    let mut lines = Vec::new();

    for outcome in outcomes {
        match outcome {
            NamespaceOutcome::Done(ns, ns_report) => {
                lines.extend(
                    ns_report
                        .version_issues
                        .iter()
                        .map(|issue| mismatch_message(&ns, issue)),
                );
                report.data.insert(ns, ns_report);
            }
            NamespaceOutcome::Failed(ns, e) => {
                warn!("Failed to inspect namespace {}: {}", ns, e);
                report.errors.insert(ns, e.to_string());
            }
            NamespaceOutcome::Skipped(ns) => {
                debug!("Skipping namespace {} after cancellation", ns);
                report.skipped.push(ns);
            }
        }
    }

    let mut summary = if lines.is_empty() {
        NO_MISMATCHES.to_string()
    } else {
        lines.join("\n")
    };
    for (ns, error) in &report.errors {
        summary.push_str(&format!("\nNamespace '{}' could not be inspected: {}", ns, error));
    }
    if !report.skipped.is_empty() {
        summary.push_str(&format!(
            "\nReport is partial: cancelled before {} namespace(s) were inspected.",
            report.skipped.len()
        ));
    }

    report.partial = !report.errors.is_empty() || !report.skipped.is_empty();
    report.summary = summary;
    report
}
