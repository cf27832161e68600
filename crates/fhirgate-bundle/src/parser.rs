//! Resource Parser: turns decoded request text into a [`Resource`] tree.

use fhirgate_core::{FhirVersion, ResourceType};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::ParseError;
use crate::model::{Bundle, BundleEntry, BundleEntryRequest, BundleType, GenericResource, Resource};

/// Default bound on Bundle-in-Bundle nesting.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Schema-aware decoder from text to a typed resource tree.
///
/// Implementations must be immutable after construction: one instance is
/// built at startup and shared by every request.
pub trait ResourceParser: Send + Sync {
    /// FHIR version whose schema the parser enforces.
    fn fhir_version(&self) -> FhirVersion;

    fn parse_resource(&self, text: &str) -> Result<Resource, ParseError>;
}

/// FHIR JSON parser.
///
/// Parsing is lenient about elements it does not model. The JSON shape of the
/// elements the decomposer relies on (`resourceType`, `Bundle.entry`,
/// `entry.request`, embedded resources) is validated, while `Bundle.type` and
/// `entry.request.method` codes are kept as written and judged by the
/// decomposer.
#[derive(Debug, Clone)]
pub struct JsonResourceParser {
    version: FhirVersion,
    max_depth: usize,
}

impl Default for JsonResourceParser {
    fn default() -> Self {
        Self::new(FhirVersion::R4)
    }
}

impl JsonResourceParser {
    pub fn new(version: FhirVersion) -> Self {
        Self {
            version,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn parse_object(
        &self,
        mut object: Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Result<Resource, ParseError> {
        if depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }

        let resource_type = match object.get("resourceType") {
            Some(Value::String(name)) => name.parse::<ResourceType>().map_err(|source| {
                ParseError::InvalidResourceType {
                    path: format!("{path}.resourceType"),
                    source,
                }
            })?,
            Some(_) => {
                return Err(ParseError::invalid_element(
                    format!("{path}.resourceType"),
                    "expected a string",
                ));
            }
            None => {
                return Err(ParseError::MissingResourceType {
                    path: path.to_string(),
                });
            }
        };

        let id = optional_string(&object, "id", path)?;

        if resource_type != ResourceType::Bundle {
            return Ok(Resource::Other(GenericResource {
                resource_type,
                id,
                content: object,
            }));
        }

        let bundle_type = optional_string(&object, "type", path)?
            .map(|code| BundleType::from_code(&code, self.version));

        let entry = match object.remove("entry") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    self.parse_entry(item, &format!("{path}.entry[{index}]"), depth)
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ParseError::invalid_element(
                    format!("{path}.entry"),
                    "expected an array",
                ));
            }
        };

        Ok(Resource::Bundle(Bundle {
            id,
            bundle_type,
            entry,
        }))
    }

    fn parse_entry(
        &self,
        item: Value,
        path: &str,
        depth: usize,
    ) -> Result<BundleEntry, ParseError> {
        let Value::Object(mut entry) = item else {
            return Err(ParseError::invalid_element(path, "expected an object"));
        };

        let full_url = optional_string(&entry, "fullUrl", path)?;

        let request = match entry.remove("request") {
            None | Some(Value::Null) => None,
            Some(Value::Object(request)) => {
                let request_path = format!("{path}.request");
                let method = optional_string(&request, "method", &request_path)?;
                let url = optional_string(&request, "url", &request_path)?;
                Some(BundleEntryRequest { method, url })
            }
            Some(_) => {
                return Err(ParseError::invalid_element(
                    format!("{path}.request"),
                    "expected an object",
                ));
            }
        };

        let resource = match entry.remove("resource") {
            None | Some(Value::Null) => None,
            Some(Value::Object(object)) => {
                Some(self.parse_object(object, &format!("{path}.resource"), depth + 1)?)
            }
            Some(_) => {
                return Err(ParseError::invalid_element(
                    format!("{path}.resource"),
                    "expected an object",
                ));
            }
        };

        Ok(BundleEntry {
            full_url,
            request,
            resource,
        })
    }
}

impl ResourceParser for JsonResourceParser {
    fn fhir_version(&self) -> FhirVersion {
        self.version
    }

    fn parse_resource(&self, text: &str) -> Result<Resource, ParseError> {
        let Value::Object(object) = serde_json::from_str::<Value>(text)? else {
            return Err(ParseError::NotAnObject);
        };
        let root = match object.get("resourceType").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => "$".to_string(),
        };
        let resource = self.parse_object(object, &root, 0)?;
        trace!(
            resource_type = %resource.resource_type(),
            fhir.version = %self.version,
            "parsed resource"
        );
        Ok(resource)
    }
}

fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, ParseError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParseError::invalid_element(
            format!("{path}.{key}"),
            "expected a string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpVerb;
    use serde_json::json;

    fn parse(value: Value) -> Result<Resource, ParseError> {
        JsonResourceParser::default().parse_resource(&value.to_string())
    }

    #[test]
    fn parses_non_bundle_resources_verbatim() {
        let patient = json!({
            "resourceType": "Patient",
            "id": "p1",
            "name": [{"family": "Müller"}],
            "_birthDate": {"extension": []}
        });
        let resource = parse(patient.clone()).unwrap();
        let Resource::Other(generic) = &resource else {
            panic!("expected a non-bundle resource");
        };
        assert_eq!(generic.resource_type, ResourceType::Patient);
        assert_eq!(generic.id.as_deref(), Some("p1"));
        assert_eq!(serde_json::to_value(&resource).unwrap(), patient);
    }

    #[test]
    fn parses_bundle_structure() {
        let resource = parse(json!({
            "resourceType": "Bundle",
            "id": "tx",
            "type": "transaction",
            "meta": {"lastUpdated": "2024-01-01T00:00:00Z"},
            "entry": [
                {
                    "fullUrl": "urn:uuid:61ebe359-bfdc-4613-8bf2-c5e300945f0a",
                    "request": {"method": "POST", "url": "Patient"},
                    "resource": {"resourceType": "Patient"}
                },
                {"request": {"method": "GET", "url": "Patient?name=peter"}}
            ]
        }))
        .unwrap();

        let bundle = resource.as_bundle().expect("bundle");
        assert_eq!(bundle.id.as_deref(), Some("tx"));
        assert!(bundle.is_transaction());
        assert_eq!(bundle.entry.len(), 2);
        assert_eq!(bundle.entry[0].request.as_ref().unwrap().verb(), Some(HttpVerb::Post));
        assert_eq!(
            bundle.entry[1].request.as_ref().unwrap().url.as_deref(),
            Some("Patient?name=peter")
        );
        assert!(bundle.entry[1].resource.is_none());
    }

    #[test]
    fn bundle_type_codes_are_kept_as_written() {
        let resource = parse(json!({"resourceType": "Bundle"})).unwrap();
        assert_eq!(resource.as_bundle().unwrap().bundle_type, None);

        for code in ["bogus", "Transaction"] {
            let resource = parse(json!({"resourceType": "Bundle", "type": code})).unwrap();
            assert_eq!(
                resource.as_bundle().unwrap().bundle_type,
                Some(BundleType::Unknown(code.to_string()))
            );
        }

        let err = parse(json!({"resourceType": "Bundle", "type": 1})).unwrap_err();
        assert_eq!(err.path(), Some("Bundle.type"));
    }

    #[test]
    fn subscription_notification_is_only_known_to_r5() {
        let payload = json!({"resourceType": "Bundle", "type": "subscription-notification"});
        let r4 = parse(payload.clone()).unwrap();
        assert_eq!(
            r4.as_bundle().unwrap().bundle_type,
            Some(BundleType::Unknown("subscription-notification".into()))
        );

        let r5 = JsonResourceParser::new(FhirVersion::R5);
        let resource = r5.parse_resource(&payload.to_string()).unwrap();
        assert_eq!(
            resource.as_bundle().unwrap().bundle_type,
            Some(BundleType::SubscriptionNotification)
        );
    }

    #[test]
    fn rejects_schema_violations() {
        assert!(matches!(
            JsonResourceParser::default().parse_resource("{\"resourceType\":"),
            Err(ParseError::Syntax(_))
        ));
        assert!(matches!(parse(json!([1, 2])), Err(ParseError::NotAnObject)));
        assert!(matches!(
            parse(json!({"id": "x"})),
            Err(ParseError::MissingResourceType { .. })
        ));
        assert!(matches!(
            parse(json!({"resourceType": "patient"})),
            Err(ParseError::InvalidResourceType { .. })
        ));
        assert!(matches!(
            parse(json!({"resourceType": "Patient", "id": 7})),
            Err(ParseError::InvalidElement { .. })
        ));
        assert!(matches!(
            parse(json!({"resourceType": "Bundle", "type": "transaction", "entry": {}})),
            Err(ParseError::InvalidElement { .. })
        ));
    }

    #[test]
    fn entry_methods_are_kept_as_written() {
        let resource = parse(json!({
            "resourceType": "Bundle",
            "type": "batch",
            "entry": [
                {"request": {"method": "OPTIONS", "url": "Patient"}},
                {"request": {"url": "Patient"}}
            ]
        }))
        .unwrap();
        let entry = &resource.as_bundle().unwrap().entry;
        assert_eq!(entry[0].request.as_ref().unwrap().method.as_deref(), Some("OPTIONS"));
        assert_eq!(entry[0].request.as_ref().unwrap().verb(), None);
        assert_eq!(entry[1].request.as_ref().unwrap().method, None);
    }

    #[test]
    fn rejects_invalid_entries_with_their_path() {
        let err = parse(json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": [
                {"request": {"method": "GET", "url": "Patient/1"}},
                {"request": {"method": 42, "url": "Patient"}}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.path(), Some("Bundle.entry[1].request.method"));

        let err = parse(json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": [{"request": "POST Patient"}]
        }))
        .unwrap_err();
        assert_eq!(err.path(), Some("Bundle.entry[0].request"));

        let err = parse(json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": [{"request": {"method": "PUT"}, "resource": {"id": "no-type"}}]
        }))
        .unwrap_err();
        assert_eq!(err.path(), Some("Bundle.entry[0].resource"));
    }

    #[test]
    fn null_entry_members_are_treated_as_absent() {
        let resource = parse(json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": [{"request": {"method": "GET"}, "resource": null}]
        }))
        .unwrap();
        assert!(resource.as_bundle().unwrap().entry[0].resource.is_none());
    }

    #[test]
    fn nested_bundles_are_depth_limited() {
        let mut payload = json!({"resourceType": "Bundle", "type": "collection"});
        for _ in 0..3 {
            payload = json!({
                "resourceType": "Bundle",
                "type": "collection",
                "entry": [{"resource": payload}]
            });
        }
        let text = payload.to_string();

        assert!(JsonResourceParser::default().parse_resource(&text).is_ok());

        let shallow = JsonResourceParser::default().with_max_depth(2);
        assert_eq!(shallow.max_depth(), 2);
        assert!(matches!(
            shallow.parse_resource(&text),
            Err(ParseError::NestingTooDeep { max_depth: 2, .. })
        ));
    }
}
