use thiserror::Error;

/// Core error types shared by the fhirgate crates
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid FHIR resource type: {0}")]
    InvalidResourceType(String),

    #[error("Unknown FHIR version: {0}")]
    UnknownFhirVersion(String),

    #[error("Unsupported character encoding: {0}")]
    UnsupportedCharset(String),

    #[error("Payload is not valid {charset}: {message}")]
    InvalidEncoding {
        charset: &'static str,
        message: String,
    },
}

impl CoreError {
    /// Create a new InvalidResourceType error
    pub fn invalid_resource_type(resource_type: impl Into<String>) -> Self {
        Self::InvalidResourceType(resource_type.into())
    }

    /// Create a new UnknownFhirVersion error
    pub fn unknown_fhir_version(version: impl Into<String>) -> Self {
        Self::UnknownFhirVersion(version.into())
    }

    /// Create a new UnsupportedCharset error
    pub fn unsupported_charset(label: impl Into<String>) -> Self {
        Self::UnsupportedCharset(label.into())
    }

    /// Create a new InvalidEncoding error for the named charset
    pub fn invalid_encoding(charset: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            charset,
            message: message.into(),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::invalid_resource_type("patient");
        assert_eq!(err.to_string(), "Invalid FHIR resource type: patient");

        let err = CoreError::unknown_fhir_version("DSTU2");
        assert_eq!(err.to_string(), "Unknown FHIR version: DSTU2");
    }

    #[test]
    fn test_encoding_errors() {
        let err = CoreError::unsupported_charset("koi8-r");
        assert_eq!(err.to_string(), "Unsupported character encoding: koi8-r");

        let err = CoreError::invalid_encoding("UTF-8", "invalid byte at offset 3");
        assert_eq!(
            err.to_string(),
            "Payload is not valid UTF-8: invalid byte at offset 3"
        );
    }
}
