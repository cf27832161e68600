use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "fhirgate")]
#[command(about = "fhirgate: split FHIR transaction Bundles into per-entry operations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file (defaults to ./fhirgate.toml when present)
    #[arg(short, long, global = true, env = "FHIRGATE_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decompose a transaction Bundle into its entries
    Decompose(PayloadArgs),
    /// Parse a payload and describe the resource it contains
    Parse(PayloadArgs),
    /// Show the effective configuration
    Config,
}

#[derive(clap::Args)]
pub struct PayloadArgs {
    /// Path to the payload file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
    /// Character encoding of the payload (e.g. UTF-8, ISO-8859-1, UTF-16LE)
    #[arg(short, long)]
    pub encoding: Option<String>,
    /// Content-Type header value; its charset parameter is used when --encoding is absent
    #[arg(long)]
    pub content_type: Option<String>,
}
