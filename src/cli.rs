use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "kubectl-insight")]
#[command(about = "Inspect cluster workloads and flag image drift across deployments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Kubeconfig context (defaults to the current context)
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub output: OutputFormat,

    /// Read timeout for each API request, in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub request_timeout: u64,

    /// Maximum number of namespaces inspected concurrently
    #[arg(long, default_value_t = 8, global = true)]
    pub concurrency: usize,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    #[command(flatten)]
    Query(Query),
    /// List registered custom-resource kinds
    Kinds,
}

/// Subcommands that read from the cluster.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Query {
    /// Deployments, pods and services with image drift detection
    Report {
        /// Namespace (all namespaces if omitted)
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
    /// Deployments with replica counts and images
    Deployments {
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
    /// Pods with phase, addresses, restarts and images
    Pods {
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
    /// Services with type, cluster IP and ports
    Services {
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
    /// Custom resources, by friendly name or API group
    Custom {
        /// Friendly name (e.g. argocd_applications) or API group
        identifier: String,

        /// API version (needed for kinds that are not registered)
        #[arg(long)]
        version: Option<String>,

        /// Resource plural
        #[arg(long)]
        plural: Option<String>,

        /// Namespace (cluster-wide if omitted)
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}
