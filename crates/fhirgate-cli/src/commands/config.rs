use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::output::print_json;

pub fn show(config: &AppConfig, source: Option<&str>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table => {
            println!(
                "{}: {}",
                "Source".cyan(),
                source.unwrap_or("(defaults and environment)")
            );
            let rendered =
                toml::to_string_pretty(config).context("Failed to render configuration")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
