mod cli;
mod correlate;
mod crd;
mod error;
mod kubernetes;
mod output;
mod report;
mod summarize;
mod types;
mod utils;

use clap::Parser;
use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use cli::{Cli, Command, OutputFormat, Query};
use crd::CrdRegistry;
use kubernetes::{KubeFetcher, initialize_client};
use report::Reporter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the result
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = CrdRegistry::builtin();
    let color = std::io::stdout().is_terminal();

    let rendered = match &cli.command {
        // Listing registered kinds needs no cluster access
        Command::Kinds => {
            let kinds = registry.entries().to_vec();
            output::render(&kinds, cli.output, |k| output::kinds_text(k))?
        }
        Command::Query(query) => {
            let client = initialize_client(
                cli.context.as_deref(),
                Duration::from_secs(cli.request_timeout),
            )
            .await?;
            let fetcher = KubeFetcher::new(client);
            let reporter = Reporter::new(&fetcher, &registry, cli.concurrency);
            run_query(&reporter, query, cli.output, color).await?
        }
    };

    println!("{}", rendered);
    Ok(())
}

async fn run_query(
    reporter: &Reporter<'_>,
    query: &Query,
    format: OutputFormat,
    color: bool,
) -> anyhow::Result<String> {
    let rendered = match query {
        Query::Report { namespace } => {
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if watch_interrupts(tokio::signal::ctrl_c, cancel_tx).await {
                    error!("Interrupted again, aborting");
                    std::process::exit(130);
                }
            });

            let report = reporter
                .cluster_report(namespace.as_deref(), &cancel_rx)
                .await?;
            info!(
                "Inspected {} namespaces ({} failed, {} skipped)",
                report.data.len(),
                report.errors.len(),
                report.skipped.len()
            );
            output::render(&report, format, |r| output::report_text(r, color))?
        }
        Query::Deployments { namespace } => {
            let view = reporter.deployments(namespace.as_deref()).await?;
            output::render(&view, format, |v| output::deployments_text(v, color))?
        }
        Query::Pods { namespace } => {
            let view = reporter.pods(namespace.as_deref()).await?;
            output::render(&view, format, |v| output::pods_text(v, color))?
        }
        Query::Services { namespace } => {
            let view = reporter.services(namespace.as_deref()).await?;
            output::render(&view, format, |v| output::services_text(v, color))?
        }
        Query::Custom {
            identifier,
            version,
            plural,
            namespace,
        } => {
            let result = reporter
                .custom_objects(
                    identifier,
                    version.as_deref(),
                    plural.as_deref(),
                    namespace.as_deref(),
                )
                .await;
            if let Some(e) = result.error() {
                error!("Custom object query failed: {}", e);
            }
            output::render(&result, format, |r| output::custom_text(r, color))?
        }
    };
    Ok(rendered)
}

/// The first interrupt stops new namespaces from starting. Returns `true` once
/// a second interrupt arrives, `false` if signals cannot be received.
async fn watch_interrupts<F, Fut>(mut interrupted: F, cancel: watch::Sender<bool>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupted().await.is_err() {
        return false;
    }
    warn!("Interrupted, finishing namespaces in progress (Ctrl-C again to abort)");
    let _ = cancel.send(true);
    interrupted().await.is_ok()
}
