//! Error types for resource parsing and Bundle decomposition.

use fhirgate_core::{CoreError, OperationOutcome, ResourceType};
use serde::Serialize;
use thiserror::Error;

use crate::model::HttpVerb;

/// Errors raised by a [`ResourceParser`](crate::ResourceParser) when text does
/// not describe a resource of the domain schema.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("resource must be a JSON object")]
    NotAnObject,

    #[error("missing resourceType at {path}")]
    MissingResourceType { path: String },

    #[error("invalid resourceType at {path}: {source}")]
    InvalidResourceType {
        path: String,
        #[source]
        source: CoreError,
    },

    #[error("missing required element {path}")]
    MissingElement { path: String },

    #[error("invalid element {path}: {message}")]
    InvalidElement { path: String, message: String },

    #[error("resources nested deeper than {max_depth} levels at {path}")]
    NestingTooDeep { path: String, max_depth: usize },
}

impl ParseError {
    pub fn missing_element(path: impl Into<String>) -> Self {
        Self::MissingElement { path: path.into() }
    }

    pub fn invalid_element(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidElement {
            path: path.into(),
            message: message.into(),
        }
    }

    /// FHIRPath-like location of the offending element, if known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Syntax(_) | Self::NotAnObject => None,
            Self::MissingResourceType { path }
            | Self::InvalidResourceType { path, .. }
            | Self::MissingElement { path }
            | Self::InvalidElement { path, .. }
            | Self::NestingTooDeep { path, .. } => Some(path),
        }
    }
}

/// Why a payload could not be turned into a resource.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error(transparent)]
    Encoding(#[from] CoreError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure classes surfaced to the authorization/routing consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecomposeErrorKind {
    MalformedPayload,
    NotABundle,
    UnsupportedBundleType,
    MissingEntryResource,
}

impl DecomposeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedPayload => "malformed-payload",
            Self::NotABundle => "not-a-bundle",
            Self::UnsupportedBundleType => "unsupported-bundle-type",
            Self::MissingEntryResource => "missing-entry-resource",
        }
    }
}

impl std::fmt::Display for DecomposeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bundle decomposition errors. All of them are deterministic input
/// validation failures; retrying with the same payload fails the same way.
#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    #[error("the provided resource is not a Bundle (found {resource_type})")]
    NotABundle { resource_type: ResourceType },

    #[error("bundle type needs to be transaction (found {})", .found.as_deref().unwrap_or("none"))]
    UnsupportedBundleType { found: Option<String> },

    #[error("bundle entry requires a resource field (entry {index}, method {verb})")]
    MissingEntryResource { index: usize, verb: HttpVerb },
}

impl DecomposeError {
    pub fn not_a_bundle(resource_type: ResourceType) -> Self {
        Self::NotABundle { resource_type }
    }

    pub fn unsupported_bundle_type(found: Option<impl Into<String>>) -> Self {
        Self::UnsupportedBundleType {
            found: found.map(Into::into),
        }
    }

    pub fn missing_entry_resource(index: usize, verb: HttpVerb) -> Self {
        Self::MissingEntryResource { index, verb }
    }

    pub fn kind(&self) -> DecomposeErrorKind {
        match self {
            Self::MalformedPayload(_) => DecomposeErrorKind::MalformedPayload,
            Self::NotABundle { .. } => DecomposeErrorKind::NotABundle,
            Self::UnsupportedBundleType { .. } => DecomposeErrorKind::UnsupportedBundleType,
            Self::MissingEntryResource { .. } => DecomposeErrorKind::MissingEntryResource,
        }
    }

    /// Status the embedding gateway should answer with. Every decomposition
    /// failure is caused by the request payload.
    pub fn http_status(&self) -> u16 {
        400
    }

    pub fn to_operation_outcome(&self) -> OperationOutcome {
        match self {
            Self::MalformedPayload(PayloadError::Parse(err)) => {
                let outcome = OperationOutcome::single("error", "structure", self.to_string());
                match err.path() {
                    Some(path) => outcome.with_expression(path),
                    None => outcome,
                }
            }
            Self::MalformedPayload(PayloadError::Encoding(_)) => {
                OperationOutcome::single("error", "invalid", self.to_string())
            }
            Self::NotABundle { .. } => {
                OperationOutcome::single("error", "invalid", self.to_string())
            }
            Self::UnsupportedBundleType { .. } => {
                OperationOutcome::single("error", "not-supported", self.to_string())
                    .with_expression("Bundle.type")
            }
            Self::MissingEntryResource { index, .. } => {
                OperationOutcome::single("error", "required", self.to_string())
                    .with_expression(format!("Bundle.entry[{index}].resource"))
            }
        }
    }
}

impl From<ParseError> for DecomposeError {
    fn from(err: ParseError) -> Self {
        Self::MalformedPayload(PayloadError::Parse(err))
    }
}

impl From<CoreError> for DecomposeError {
    fn from(err: CoreError) -> Self {
        Self::MalformedPayload(PayloadError::Encoding(err))
    }
}
