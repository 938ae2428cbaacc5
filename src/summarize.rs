//! Human-readable summaries of custom-object lists.

use crate::crd::CrdKind;
use crate::utils::parse_expiry;
use chrono::{DateTime, Utc};
use serde_json::Value;

const UNKNOWN_FIELD: &str = "Unknown";
const UNKNOWN_META: &str = "<unknown>";
const EXPIRY_WINDOW_DAYS: i64 = 7;

fn text_at<'a>(item: &'a Value, pointer: &str) -> Option<&'a str> {
    item.pointer(pointer).and_then(Value::as_str)
}

fn name_and_namespace(item: &Value) -> (&str, &str) {
    (
        text_at(item, "/metadata/name").unwrap_or(UNKNOWN_META),
        text_at(item, "/metadata/namespace").unwrap_or(UNKNOWN_META),
    )
}

/// Dispatch to the summarizer registered for a known kind.
pub fn summarize(kind: CrdKind, items: &[Value]) -> String {
    match kind {
        CrdKind::ArgoApplications => summarize_sync_health(items),
        CrdKind::CertManagerCertificates => summarize_certificates(items, Utc::now()),
    }
}

/// GitOps application sync and health state.
pub fn summarize_sync_health(items: &[Value]) -> String {
    let total = items.len();
    let synced = items
        .iter()
        .filter(|app| text_at(app, "/status/sync/status") == Some("Synced"))
        .count();
    let healthy = items
        .iter()
        .filter(|app| text_at(app, "/status/health/status") == Some("Healthy"))
        .count();

    let details: Vec<String> = items
        .iter()
        .map(|app| {
            let (name, namespace) = name_and_namespace(app);
            format!(
                "{} ({}) — Sync: {}, Health: {}",
                name,
                namespace,
                text_at(app, "/status/sync/status").unwrap_or(UNKNOWN_FIELD),
                text_at(app, "/status/health/status").unwrap_or(UNKNOWN_FIELD)
            )
        })
        .collect();

    let counts = format!(
        "{} total — {} synced, {} out-of-sync, {} healthy, {} degraded.",
        total,
        synced,
        total - synced,
        healthy,
        total - healthy
    );
    format!(
        "📦 ArgoCD Applications: {}\nDetails:\n{}",
        counts,
        details.join("\n")
    )
}

/// Certificates expiring within the window, relative to `now`.
///
/// Items with a missing or unparsable `status.notAfter` are left out of the
/// expiring list.
pub fn summarize_certificates(items: &[Value], now: DateTime<Utc>) -> String {
    let expiring: Vec<String> = items
        .iter()
        .filter_map(|cert| {
            let expiry = parse_expiry(text_at(cert, "/status/notAfter")?)?;
            // Floor, so an expiry an hour ago reads as -1 days.
            let days_left = (expiry - now).num_seconds().div_euclid(86_400);
            if days_left >= EXPIRY_WINDOW_DAYS {
                return None;
            }
            let (name, namespace) = name_and_namespace(cert);
            Some(format!("{} ({}) — expires in {} days", name, namespace, days_left))
        })
        .collect();

    let details = if expiring.is_empty() {
        format!("No certificates expiring within {} days.", EXPIRY_WINDOW_DAYS)
    } else {
        expiring.join("\n")
    };

    format!(
        "🔐 Cert-Manager Certificates: {} total.\nExpiring soon (<{} days): {}\n{}",
        items.len(),
        EXPIRY_WINDOW_DAYS,
        expiring.len(),
        details
    )
}

/// Fallback for kinds without a registered summarizer.
pub fn summarize_generic(items: &[Value], plural: &str) -> String {
    format!("Retrieved {} {} objects.", items.len(), plural)
}
