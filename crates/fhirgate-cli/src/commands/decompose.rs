use anyhow::Result;
use colored::Colorize;
use fhirgate_bundle::{BundleDecomposer, DecomposeError, InMemoryRequest, ResourceParser};
use tracing::info;

use crate::cli::OutputFormat;
use crate::output::{print_entries, print_outcome, print_resource};

pub fn decompose(
    decomposer: &BundleDecomposer,
    request: &InMemoryRequest,
    format: OutputFormat,
) -> Result<()> {
    let entries = decomposer
        .find_resources_in_bundle(request)
        .map_err(report)?;
    info!(
        entries = entries.len(),
        fhir.version = %decomposer.parser().fhir_version(),
        "bundle decomposed"
    );
    print_entries(&entries, format)
}

pub fn parse(
    decomposer: &BundleDecomposer,
    request: &InMemoryRequest,
    format: OutputFormat,
) -> Result<()> {
    let resource = decomposer
        .parse_resource_from_request(request)
        .map_err(report)?;
    info!(resource = %resource.reference(), "payload parsed");
    print_resource(&resource, format)
}

/// Print the OperationOutcome a gateway would answer with and hand the error on.
fn report(err: DecomposeError) -> anyhow::Error {
    eprintln!(
        "{} {} ({})",
        "HTTP".yellow(),
        err.http_status(),
        err.kind().as_str().yellow()
    );
    print_outcome(&err.to_operation_outcome());
    err.into()
}
