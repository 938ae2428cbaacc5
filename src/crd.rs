//! Known custom-resource kinds and identifier resolution.

use crate::error::CrdError;
use serde::Serialize;

/// Custom-resource kinds with a dedicated summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrdKind {
    ArgoApplications,
    CertManagerCertificates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrdDescriptor {
    /// Friendly lookup key, e.g. `argocd_applications`.
    pub key: String,
    pub group: String,
    pub version: String,
    pub plural: String,
    pub kind: CrdKind,
}

impl CrdDescriptor {
    pub fn new(key: &str, group: &str, version: &str, plural: &str, kind: CrdKind) -> Self {
        Self {
            key: key.to_string(),
            group: group.to_string(),
            version: version.to_string(),
            plural: plural.to_string(),
            kind,
        }
    }
}

/// What a caller-supplied identifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCrd {
    Known(CrdDescriptor),
    Generic {
        group: String,
        version: String,
        plural: String,
    },
}

impl ResolvedCrd {
    pub fn group(&self) -> &str {
        match self {
            ResolvedCrd::Known(d) => &d.group,
            ResolvedCrd::Generic { group, .. } => group,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            ResolvedCrd::Known(d) => &d.version,
            ResolvedCrd::Generic { version, .. } => version,
        }
    }

    pub fn plural(&self) -> &str {
        match self {
            ResolvedCrd::Known(d) => &d.plural,
            ResolvedCrd::Generic { plural, .. } => plural,
        }
    }
}

/// Read-only table of known kinds, built once at startup.
#[derive(Debug, Clone)]
pub struct CrdRegistry {
    entries: Vec<CrdDescriptor>,
}

impl CrdRegistry {
    pub fn builtin() -> Self {
        Self {
            entries: Vec::new(),
        }
        .with_entry(CrdDescriptor::new(
            "argocd_applications",
            "argoproj.io",
            "v1alpha1",
            "applications",
            CrdKind::ArgoApplications,
        ))
        .with_entry(CrdDescriptor::new(
            "certmanager_certificates",
            "cert-manager.io",
            "v1",
            "certificates",
            CrdKind::CertManagerCertificates,
        ))
    }

    /// Add an entry. Entries with an existing key are ignored.
    pub fn with_entry(mut self, descriptor: CrdDescriptor) -> Self {
        if !self.entries.iter().any(|e| e.key == descriptor.key) {
            self.entries.push(descriptor);
        }
        self
    }

    pub fn entries(&self) -> &[CrdDescriptor] {
        &self.entries
    }

    /// Resolve an identifier, in order: exact friendly key, then
    /// case-insensitive (group, plural), then the generic path which needs
    /// group, version and plural all present.
    pub fn resolve(
        &self,
        identifier: &str,
        version: Option<&str>,
        plural: Option<&str>,
    ) -> Result<ResolvedCrd, CrdError> {
        if let Some(known) = self.entries.iter().find(|e| e.key == identifier) {
            return Ok(ResolvedCrd::Known(known.clone()));
        }

        if let Some(plural) = plural
            && let Some(known) = self.entries.iter().find(|e| {
                e.group.eq_ignore_ascii_case(identifier) && e.plural.eq_ignore_ascii_case(plural)
            })
        {
            return Ok(ResolvedCrd::Known(known.clone()));
        }

        match (version, plural) {
            (Some(version), Some(plural))
                if !identifier.is_empty() && !version.is_empty() && !plural.is_empty() =>
            {
                Ok(ResolvedCrd::Generic {
                    group: identifier.to_string(),
                    version: version.to_string(),
                    plural: plural.to_string(),
                })
            }
            _ => Err(CrdError::MissingParameters),
        }
    }
}

impl Default for CrdRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
