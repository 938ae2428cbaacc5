use crate::cli::OutputFormat;
use crate::crd::CrdDescriptor;
use crate::report::NO_MISMATCHES;
use crate::types::{
    ClusterReport, CustomObjectResult, DeploymentRecord, NamespacedList, PodRecord, ServiceRecord,
};
use crate::utils::{format_replicas, phase_color};
use crossterm::style::{Color, Stylize};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;

/// Serialize as JSON or YAML, or fall back to the text renderer.
pub fn render<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Text => text(value),
    })
}

fn paint(s: &str, color: Color, enabled: bool) -> String {
    if enabled {
        s.with(color).to_string()
    } else {
        s.to_string()
    }
}

pub fn report_text(report: &ClusterReport, color: bool) -> String {
    let mut out = Vec::new();
    for line in report.summary.lines() {
        let tint = if line == NO_MISMATCHES {
            Color::Green
        } else if line.contains("could not be inspected") || line.starts_with("Report is partial") {
            Color::Red
        } else {
            Color::Yellow
        };
        out.push(paint(line, tint, color));
    }
    out.push(String::new());
    for (ns, ns_report) in &report.data {
        out.push(format!(
            "{}: {} deployments, {} pods, {} services, {} version issues",
            paint(ns, Color::Cyan, color),
            ns_report.deployments.len(),
            ns_report.pods.len(),
            ns_report.services.len(),
            ns_report.version_issues.len()
        ));
    }
    out.join("\n")
}

fn view_text<T>(view: &NamespacedList<T>, color: bool, line: impl Fn(&T) -> String) -> String {
    let mut out = Vec::new();
    for (ns, items) in &view.data {
        out.push(paint(&format!("[{}]", ns), Color::Cyan, color));
        if items.is_empty() {
            out.push("  (none)".to_string());
        }
        out.extend(items.iter().map(|item| format!("  {}", line(item))));
    }
    for (ns, error) in &view.errors {
        let line = format!("[{}] error: {}", ns, error);
        out.push(paint(&line, Color::Red, color));
    }
    out.join("\n")
}

pub fn deployments_text(view: &NamespacedList<DeploymentRecord>, color: bool) -> String {
    view_text(view, color, |d| {
        format!(
            "{} {} {}",
            d.name,
            format_replicas(d.available_replicas, d.replicas),
            d.images.join(",")
        )
    })
}

pub fn pods_text(view: &NamespacedList<PodRecord>, color: bool) -> String {
    view_text(view, color, |p| {
        let phase = p.phase.as_deref().unwrap_or("Unknown");
        format!(
            "{} {} ip={} node={} restarts={} {}",
            p.name,
            paint(phase, phase_color(p.phase.as_deref()), color),
            p.pod_ip.as_deref().unwrap_or("-"),
            p.host_ip.as_deref().unwrap_or("-"),
            p.restart_count,
            p.images.join(",")
        )
    })
}

pub fn services_text(view: &NamespacedList<ServiceRecord>, color: bool) -> String {
    view_text(view, color, |s| {
        let ports: Vec<String> = s
            .ports
            .iter()
            .map(|p| match &p.target_port {
                Some(target) => format!("{}->{}", p.port, target_port_text(target)),
                None => p.port.to_string(),
            })
            .collect();
        format!(
            "{} {} {} {}",
            s.name,
            s.type_.as_deref().unwrap_or("-"),
            s.cluster_ip.as_deref().unwrap_or("-"),
            ports.join(",")
        )
    })
}

fn target_port_text(target: &IntOrString) -> String {
    match target {
        IntOrString::Int(port) => port.to_string(),
        IntOrString::String(name) => name.clone(),
    }
}

pub fn custom_text(result: &CustomObjectResult, color: bool) -> String {
    match result {
        CustomObjectResult::Found { summary, .. } => summary.clone(),
        CustomObjectResult::Failed { error } => {
            paint(&format!("error: {}", error), Color::Red, color)
        }
    }
}

pub fn kinds_text(kinds: &[CrdDescriptor]) -> String {
    kinds
        .iter()
        .map(|k| format!("{} {}/{} {}", k.key, k.group, k.version, k.plural))
        .collect::<Vec<_>>()
        .join("\n")
}
