use chrono::{DateTime, NaiveDateTime, Utc};
use crossterm::style::Color;

/// Parse an ISO-8601 expiry timestamp. A trailing `Z` is accepted, and a
/// timestamp without an offset is taken as UTC.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Pick a color for a pod phase in text output.
pub fn phase_color(phase: Option<&str>) -> Color {
    match phase {
        Some("Running") | Some("Succeeded") => Color::Green,
        Some("Pending") => Color::Yellow,
        Some("Failed") => Color::Red,
        _ => Color::Grey,
    }
}

/// `available/desired`, with `?` for an undeclared replica count.
pub fn format_replicas(available: i32, desired: Option<i32>) -> String {
    match desired {
        Some(d) => format!("{}/{}", available, d),
        None => format!("{}/?", available),
    }
}
