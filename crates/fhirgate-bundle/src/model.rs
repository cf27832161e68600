//! In-memory resource tree produced by a [`ResourceParser`](crate::ResourceParser).
//!
//! Only the parts of a Bundle the decomposer needs are typed. Every other
//! resource keeps its full JSON content so downstream consumers can inspect it.

use fhirgate_core::{FhirVersion, ResourceType};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A parsed FHIR resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Bundle(Bundle),
    Other(GenericResource),
}

impl Resource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Bundle(_) => ResourceType::Bundle,
            Resource::Other(r) => r.resource_type.clone(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Bundle(b) => b.id.as_deref(),
            Resource::Other(r) => r.id.as_deref(),
        }
    }

    pub fn as_bundle(&self) -> Option<&Bundle> {
        match self {
            Resource::Bundle(b) => Some(b),
            Resource::Other(_) => None,
        }
    }

    /// `Type/id` when the resource has an id, otherwise just the type.
    pub fn reference(&self) -> String {
        match self.id() {
            Some(id) => format!("{}/{}", self.resource_type(), id),
            None => self.resource_type().to_string(),
        }
    }
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Resource::Bundle(b) => b.serialize(serializer),
            Resource::Other(r) => r.content.serialize(serializer),
        }
    }
}

/// Any non-Bundle resource. `content` is the complete JSON object, including
/// `resourceType`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericResource {
    pub resource_type: ResourceType,
    pub id: Option<String>,
    pub content: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub id: Option<String>,
    /// `None` when the payload omitted `Bundle.type`.
    pub bundle_type: Option<BundleType>,
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    pub fn is_transaction(&self) -> bool {
        matches!(self.bundle_type, Some(BundleType::Transaction))
    }
}

impl Serialize for Bundle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("resourceType", "Bundle")?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(bundle_type) = &self.bundle_type {
            map.serialize_entry("type", bundle_type)?;
        }
        if !self.entry.is_empty() {
            map.serialize_entry("entry", &self.entry)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BundleEntry {
    #[serde(rename = "fullUrl", skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleEntryRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
}

/// Request component of a Bundle entry.
///
/// `method` keeps the raw code: verbs only have to be valid once the Bundle is
/// known to be a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BundleEntryRequest {
    pub fn verb(&self) -> Option<HttpVerb> {
        self.method.as_deref().and_then(HttpVerb::from_code)
    }
}

/// FHIR `Bundle.type` codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    Collection,
    /// Introduced in R5.
    SubscriptionNotification,
    /// A code the configured FHIR version does not define, kept verbatim.
    Unknown(String),
}

impl BundleType {
    pub fn code(&self) -> &str {
        match self {
            BundleType::Document => "document",
            BundleType::Message => "message",
            BundleType::Transaction => "transaction",
            BundleType::TransactionResponse => "transaction-response",
            BundleType::Batch => "batch",
            BundleType::BatchResponse => "batch-response",
            BundleType::History => "history",
            BundleType::Searchset => "searchset",
            BundleType::Collection => "collection",
            BundleType::SubscriptionNotification => "subscription-notification",
            BundleType::Unknown(code) => code,
        }
    }

    /// Look up a code as defined by the given FHIR version. Codes are
    /// case-sensitive; anything unrecognised becomes [`BundleType::Unknown`].
    pub fn from_code(code: &str, version: FhirVersion) -> Self {
        match code {
            "document" => BundleType::Document,
            "message" => BundleType::Message,
            "transaction" => BundleType::Transaction,
            "transaction-response" => BundleType::TransactionResponse,
            "batch" => BundleType::Batch,
            "batch-response" => BundleType::BatchResponse,
            "history" => BundleType::History,
            "searchset" => BundleType::Searchset,
            "collection" => BundleType::Collection,
            "subscription-notification" if version == FhirVersion::R5 => {
                BundleType::SubscriptionNotification
            }
            other => BundleType::Unknown(other.to_string()),
        }
    }
}

impl Serialize for BundleType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// HTTP verbs allowed in `Bundle.entry.request.method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Head => "HEAD",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
        }
    }

    /// Verb codes are case-sensitive, as in the FHIR `http-verb` value set.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "GET" => Some(HttpVerb::Get),
            "HEAD" => Some(HttpVerb::Head),
            "POST" => Some(HttpVerb::Post),
            "PUT" => Some(HttpVerb::Put),
            "DELETE" => Some(HttpVerb::Delete),
            "PATCH" => Some(HttpVerb::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
