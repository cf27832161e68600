mod cli;
mod commands;
mod config;
mod observability;
mod output;

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use fhirgate_bundle::{BundleDecomposer, JsonResourceParser, ResourceParser};

use cli::{Cli, Commands};
use config::loader::{DEFAULT_CONFIG_FILE, load_config};
use output::print_error;

fn main() {
    if let Err(e) = dotenvy::dotenv() {
        // .env is optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    let cli = Cli::parse();

    let cfg = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            print_error(&format!("Configuration error: {e}"));
            std::process::exit(2);
        }
    };
    observability::apply_logging_level(&cfg.logging.level);

    if let Err(e) = run(&cli, &cfg) {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli, cfg: &config::AppConfig) -> Result<()> {
    let format = cli.format.unwrap_or_default();
    let parser = JsonResourceParser::new(cfg.fhir_version()).with_max_depth(cfg.parser.max_depth);
    tracing::debug!(
        fhir.release = parser.fhir_version().release(),
        parser.max_depth = parser.max_depth(),
        "parser configured"
    );
    let decomposer = BundleDecomposer::new(Arc::new(parser));

    match &cli.command {
        Commands::Decompose(args) => {
            let request = commands::build_request(args, cfg)?;
            commands::decompose::decompose(&decomposer, &request, format)?;
        }
        Commands::Parse(args) => {
            let request = commands::build_request(args, cfg)?;
            commands::decompose::parse(&decomposer, &request, format)?;
        }
        Commands::Config => {
            let source = cli.config.as_deref().or_else(|| {
                Path::new(DEFAULT_CONFIG_FILE)
                    .exists()
                    .then_some(DEFAULT_CONFIG_FILE)
            });
            commands::config::show(cfg, source, format)?;
        }
    }

    Ok(())
}
