use crate::error::FetchError;
use crate::types::{DeploymentRecord, OwnerRef, PodRecord, ServicePortRecord, ServiceRecord};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{Container, Namespace, Pod, Service};
use kube::api::{ApiResource, DynamicObject, ListParams};
use kube::core::GroupVersionKind;
use kube::{Api, Client, ResourceExt, config};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, info};

/// ReplicaSet name to the Deployment that owns it, if any.
pub type ReplicaSetIndex = BTreeMap<String, Option<String>>;

/// Read-only access to the control plane.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>, FetchError>;

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<DeploymentRecord>, FetchError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, FetchError>;

    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceRecord>, FetchError>;

    /// Returns the raw list envelope (`apiVersion`, `kind`, `metadata`, `items`).
    async fn list_custom_objects(
        &self,
        group: &str,
        version: &str,
        plural: &str,
        namespace: Option<&str>,
    ) -> Result<serde_json::Value, FetchError>;

    async fn list_replica_set_owners(
        &self,
        _namespace: &str,
    ) -> Result<ReplicaSetIndex, FetchError> {
        Ok(ReplicaSetIndex::new())
    }
}

/// Build a client from kubeconfig, either the current context or the named one.
pub async fn initialize_client(
    context: Option<&str>,
    request_timeout: Duration,
) -> anyhow::Result<Client> {
    let mut cfg = match context {
        Some(ctx) => config::Config::from_kubeconfig(&config::KubeConfigOptions {
            context: Some(ctx.to_string()),
            ..Default::default()
        })
        .await
        .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?,
        None => config::Config::infer().await?,
    };
    cfg.read_timeout = Some(request_timeout);
    info!(
        "Using cluster {} (context: {})",
        cfg.cluster_url,
        context.unwrap_or("current")
    );
    Ok(Client::try_from(cfg)?)
}

pub struct KubeFetcher {
    client: Client,
}

impl KubeFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list_namespaced<T>(&self, namespace: &str) -> Result<Vec<T>, FetchError>
    where
        T: k8s_openapi::Resource<Scope = k8s_openapi::NamespaceResourceScope>
            + k8s_openapi::Metadata<Ty = k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta>
            + serde::de::DeserializeOwned
            + Clone
            + Debug
            + Send
            + Sync,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        debug!(
            "Listed {} {} in namespace {}",
            list.items.len(),
            T::KIND,
            namespace
        );
        Ok(list.items)
    }
}

#[async_trait]
impl ResourceFetcher for KubeFetcher {
    async fn list_namespaces(&self) -> Result<Vec<String>, FetchError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<DeploymentRecord>, FetchError> {
        let items = self.list_namespaced::<Deployment>(namespace).await?;
        Ok(items.iter().map(deployment_record).collect())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, FetchError> {
        let items = self.list_namespaced::<Pod>(namespace).await?;
        Ok(items.iter().map(pod_record).collect())
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceRecord>, FetchError> {
        let items = self.list_namespaced::<Service>(namespace).await?;
        Ok(items.iter().map(service_record).collect())
    }

    async fn list_custom_objects(
        &self,
        group: &str,
        version: &str,
        plural: &str,
        namespace: Option<&str>,
    ) -> Result<serde_json::Value, FetchError> {
        // Kind is not needed to build the list URL.
        let gvk = GroupVersionKind::gvk(group, version, "");
        let resource = ApiResource::from_gvk_with_plural(&gvk, plural);
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        };
        let list = api.list(&ListParams::default()).await?;
        debug!(
            "Listed {} {}.{}/{} objects",
            list.items.len(),
            plural,
            group,
            version
        );
        serde_json::to_value(&list).map_err(|source| FetchError::Decode {
            what: format!("{}.{} list", plural, group),
            source,
        })
    }

    async fn list_replica_set_owners(
        &self,
        namespace: &str,
    ) -> Result<ReplicaSetIndex, FetchError> {
        let items = self.list_namespaced::<ReplicaSet>(namespace).await?;
        Ok(items
            .iter()
            .map(|rs| {
                let owner = rs
                    .owner_references()
                    .iter()
                    .find(|o| o.kind == "Deployment")
                    .map(|o| o.name.clone());
                (rs.name_any(), owner)
            })
            .collect())
    }
}

fn container_images(containers: &[Container]) -> Vec<String> {
    containers.iter().filter_map(|c| c.image.clone()).collect()
}

pub fn deployment_record(dep: &Deployment) -> DeploymentRecord {
    let spec = dep.spec.as_ref();
    DeploymentRecord {
        name: dep.name_any(),
        replicas: spec.and_then(|s| s.replicas),
        available_replicas: dep
            .status
            .as_ref()
            .and_then(|s| s.available_replicas)
            .unwrap_or(0),
        images: spec
            .and_then(|s| s.template.spec.as_ref())
            .map(|p| container_images(&p.containers))
            .unwrap_or_default(),
    }
}

pub fn pod_record(pod: &Pod) -> PodRecord {
    let status = pod.status.as_ref();
    PodRecord {
        name: pod.name_any(),
        phase: status.and_then(|s| s.phase.clone()),
        host_ip: status.and_then(|s| s.host_ip.clone()),
        pod_ip: status.and_then(|s| s.pod_ip.clone()),
        restart_count: status
            .and_then(|s| s.container_statuses.as_ref())
            .map(|statuses| statuses.iter().map(|cs| cs.restart_count).sum())
            .unwrap_or(0),
        images: pod
            .spec
            .as_ref()
            .map(|s| container_images(&s.containers))
            .unwrap_or_default(),
        owners: pod
            .owner_references()
            .iter()
            .map(|o| OwnerRef::new(o.kind.clone(), o.name.clone()))
            .collect(),
        deployment: None,
    }
}

pub fn service_record(svc: &Service) -> ServiceRecord {
    let spec = svc.spec.as_ref();
    ServiceRecord {
        name: svc.name_any(),
        type_: spec.and_then(|s| s.type_.clone()),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()),
        ports: spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| ServicePortRecord {
                        port: p.port,
                        target_port: p.target_port.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}
