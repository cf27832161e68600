use anyhow::Result;
use colored::Colorize;
use fhirgate_bundle::{BundleType, DecomposedEntry, Resource};
use fhirgate_core::OperationOutcome;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_entries(entries: &[DecomposedEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("Bundle has no entries.");
            } else {
                println!("{}", entries_table(entries));
                println!("Entries: {}", entries.len());
            }
            Ok(())
        }
    }
}

pub fn print_resource(resource: &Resource, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(resource),
        OutputFormat::Table => {
            println!("{} {}", "Resource:".cyan(), resource.reference().cyan());
            if let Some(bundle) = resource.as_bundle() {
                let bundle_type = bundle
                    .bundle_type
                    .as_ref()
                    .map(BundleType::code)
                    .unwrap_or("(none)");
                println!("{} {}", "Type:".cyan(), bundle_type);
                println!("{} {}", "Entries:".cyan(), bundle.entry.len());
            }
            Ok(())
        }
    }
}

pub fn entries_table(entries: &[DecomposedEntry]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["#", "Verb", "URL", "Resource"]);
    for entry in entries {
        let resource = entry
            .resource
            .as_ref()
            .map(Resource::reference)
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([
            entry.index.to_string(),
            entry.verb.to_string(),
            entry.url.clone().unwrap_or_else(|| "-".to_string()),
            resource,
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn print_outcome(outcome: &OperationOutcome) {
    match serde_json::to_string_pretty(outcome) {
        Ok(body) => eprintln!("{body}"),
        Err(e) => eprintln!("failed to render OperationOutcome: {e}"),
    }
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
