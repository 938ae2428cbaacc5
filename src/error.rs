use thiserror::Error;

/// A collaborator call against the control plane failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrdError {
    #[error("Unknown CRD and missing API details (group/version/plural required)")]
    MissingParameters,
}
