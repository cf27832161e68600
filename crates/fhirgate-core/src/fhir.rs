use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// FHIR version enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FhirVersion {
    #[default]
    #[serde(rename = "4.0.1")]
    R4,
    #[serde(rename = "4.3.0")]
    R4B,
    #[serde(rename = "5.0.0")]
    R5,
}

impl FhirVersion {
    /// Short release name ("R4", "R4B", "R5")
    pub fn release(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "R4",
            FhirVersion::R4B => "R4B",
            FhirVersion::R5 => "R5",
        }
    }
}

impl fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FhirVersion::R4 => write!(f, "4.0.1"),
            FhirVersion::R4B => write!(f, "4.3.0"),
            FhirVersion::R5 => write!(f, "5.0.0"),
        }
    }
}

impl FromStr for FhirVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "4.0.1" | "R4" => Ok(FhirVersion::R4),
            "4.3.0" | "R4B" => Ok(FhirVersion::R4B),
            "5.0.0" | "R5" => Ok(FhirVersion::R5),
            _ => Err(CoreError::unknown_fhir_version(s)),
        }
    }
}

/// Resource types the gateway commonly routes on. Anything else that is a
/// well-formed type name is carried as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Patient,
    Practitioner,
    Organization,
    Encounter,
    Observation,
    Condition,
    DiagnosticReport,
    Medication,
    MedicationRequest,
    Procedure,
    Bundle,
    OperationOutcome,
    Custom(String),
}

impl ResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Practitioner => "Practitioner",
            ResourceType::Organization => "Organization",
            ResourceType::Encounter => "Encounter",
            ResourceType::Observation => "Observation",
            ResourceType::Condition => "Condition",
            ResourceType::DiagnosticReport => "DiagnosticReport",
            ResourceType::Medication => "Medication",
            ResourceType::MedicationRequest => "MedicationRequest",
            ResourceType::Procedure => "Procedure",
            ResourceType::Bundle => "Bundle",
            ResourceType::OperationOutcome => "OperationOutcome",
            ResourceType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(ResourceType::Patient),
            "Practitioner" => Ok(ResourceType::Practitioner),
            "Organization" => Ok(ResourceType::Organization),
            "Encounter" => Ok(ResourceType::Encounter),
            "Observation" => Ok(ResourceType::Observation),
            "Condition" => Ok(ResourceType::Condition),
            "DiagnosticReport" => Ok(ResourceType::DiagnosticReport),
            "Medication" => Ok(ResourceType::Medication),
            "MedicationRequest" => Ok(ResourceType::MedicationRequest),
            "Procedure" => Ok(ResourceType::Procedure),
            "Bundle" => Ok(ResourceType::Bundle),
            "OperationOutcome" => Ok(ResourceType::OperationOutcome),
            name => {
                if is_valid_resource_type_name(name) {
                    Ok(ResourceType::Custom(name.to_string()))
                } else {
                    Err(CoreError::invalid_resource_type(name))
                }
            }
        }
    }
}

impl Serialize for ResourceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Validate if a string is a valid FHIR resource type name
pub fn is_valid_resource_type_name(name: &str) -> bool {
    // FHIR resource type names must start with uppercase letter and contain only letters
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphabetic())
}
