//! Pod-to-deployment correlation and image drift detection.
//!
//! Ownership is resolved through the ReplicaSet index when the ReplicaSet is
//! known. Otherwise the deployment name is reconstructed from the standard
//! `<deployment>-<hash>` ReplicaSet naming, which is best effort only.

use crate::kubernetes::ReplicaSetIndex;
use crate::types::{PodRecord, VersionIssue};
use std::collections::BTreeMap;

/// Deployment name to the distinct images observed on its live pods, in discovery order.
pub type ImageMap = BTreeMap<String, Vec<String>>;

pub const MISMATCH_ISSUE: &str =
    "Mismatched versions detected in pods — rollout may be incomplete or stuck.";

/// Strip the trailing hash segment from a ReplicaSet name.
pub fn deployment_from_replica_set(rs_name: &str) -> Option<&str> {
    rs_name
        .rsplit_once('-')
        .map(|(deployment, _)| deployment)
        .filter(|d| !d.is_empty())
}

pub fn owning_deployment(pod: &PodRecord, replica_sets: &ReplicaSetIndex) -> Option<String> {
    for owner in pod.owners.iter().filter(|o| o.kind == "ReplicaSet") {
        if let Some(known) = replica_sets.get(&owner.name) {
            return known.clone();
        }
        if owner.name.contains('-') {
            return deployment_from_replica_set(&owner.name).map(str::to_string);
        }
    }
    None
}

/// Fill in `deployment` on every pod that can be attributed.
pub fn attribute_pods(pods: &mut [PodRecord], replica_sets: &ReplicaSetIndex) {
    for pod in pods.iter_mut() {
        pod.deployment = owning_deployment(pod, replica_sets);
    }
}

/// Union the images of attributed pods per deployment.
///
/// A deployment missing from the map has no attributable pods, which is not
/// the same as having no drift.
pub fn correlate_images(pods: &[PodRecord]) -> ImageMap {
    let mut map = ImageMap::new();
    for pod in pods {
        let Some(deployment) = &pod.deployment else {
            continue;
        };
        if pod.images.is_empty() {
            continue;
        }
        let images = map.entry(deployment.clone()).or_default();
        for image in &pod.images {
            if !images.contains(image) {
                images.push(image.clone());
            }
        }
    }
    map
}

pub fn detect_drift(images: &ImageMap) -> Vec<VersionIssue> {
    images
        .iter()
        .filter(|(_, observed)| observed.len() > 1)
        .map(|(deployment, observed)| VersionIssue {
            deployment: deployment.clone(),
            detected_images: observed.clone(),
            issue: MISMATCH_ISSUE.to_string(),
        })
        .collect()
}

pub fn mismatch_message(namespace: &str, issue: &VersionIssue) -> String {
    format!(
        "Namespace '{}': Deployment '{}' has version mismatch — running images: {}",
        namespace,
        issue.deployment,
        issue.detected_images.join(", ")
    )
}
