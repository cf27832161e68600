pub mod charset;
pub mod error;
pub mod fhir;
pub mod outcome;

pub use charset::Charset;
pub use error::{CoreError, Result};
pub use fhir::{FhirVersion, ResourceType, is_valid_resource_type_name};
pub use outcome::{OperationOutcome, OperationOutcomeIssue};
