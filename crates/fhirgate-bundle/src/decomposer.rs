//! Bundle Decomposer: splits a transaction Bundle into per-entry operations.

use std::sync::Arc;

use fhirgate_core::Charset;
use serde::Serialize;
use tracing::debug;

use crate::error::{DecomposeError, ParseError};
use crate::model::{Bundle, BundleType, HttpVerb, Resource};
use crate::parser::{JsonResourceParser, ResourceParser};
use crate::request::RequestContext;

/// One operation of a transaction Bundle, as handed to authorization and
/// routing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecomposedEntry {
    /// Position of the entry in `Bundle.entry`.
    pub index: usize,
    pub verb: HttpVerb,
    /// `Bundle.entry.request.url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Always present unless `verb` is GET.
    pub resource: Option<Resource>,
}

/// Stateless decomposer over an injected [`ResourceParser`].
///
/// Cloning is cheap; clones share the parser.
#[derive(Debug)]
pub struct BundleDecomposer<P = JsonResourceParser> {
    parser: Arc<P>,
}

impl<P> Clone for BundleDecomposer<P> {
    fn clone(&self) -> Self {
        Self {
            parser: Arc::clone(&self.parser),
        }
    }
}

impl Default for BundleDecomposer<JsonResourceParser> {
    fn default() -> Self {
        Self::new(Arc::new(JsonResourceParser::default()))
    }
}

impl<P: ResourceParser> BundleDecomposer<P> {
    pub fn new(parser: Arc<P>) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Decode the request payload with its declared charset (UTF-8 when none
    /// was declared) and parse it into a resource.
    pub fn parse_resource_from_request<R>(&self, request: &R) -> Result<Resource, DecomposeError>
    where
        R: RequestContext + ?Sized,
    {
        let charset = Charset::from_optional_label(request.encoding())?;
        let bytes = request.load_payload_bytes();
        let text = charset.decode(bytes)?;
        let resource = self.parser.parse_resource(&text)?;
        debug!(
            charset = %charset,
            bytes = bytes.len(),
            resource_type = %resource.resource_type(),
            "parsed request payload"
        );
        Ok(resource)
    }

    /// Parse the request and decompose it. The payload must be a `transaction`
    /// Bundle; the result lists its entries in their original order.
    pub fn find_resources_in_bundle<R>(
        &self,
        request: &R,
    ) -> Result<Vec<DecomposedEntry>, DecomposeError>
    where
        R: RequestContext + ?Sized,
    {
        match self.parse_resource_from_request(request)? {
            Resource::Bundle(bundle) => decompose_bundle(bundle),
            Resource::Other(other) => Err(DecomposeError::not_a_bundle(other.resource_type)),
        }
    }
}

/// Decompose an already parsed Bundle.
///
/// Either every entry is returned or the first invalid entry fails the whole
/// call. The Bundle type is checked before any entry is looked at, so entry
/// requests and verbs are only validated for transactions. A GET entry may
/// omit its resource; any resource it does carry is passed through unchanged.
pub fn decompose_bundle(bundle: Bundle) -> Result<Vec<DecomposedEntry>, DecomposeError> {
    if !bundle.is_transaction() {
        return Err(DecomposeError::unsupported_bundle_type(
            bundle.bundle_type.as_ref().map(BundleType::code),
        ));
    }

    let entries = bundle
        .entry
        .into_iter()
        .enumerate()
        .map(|(index, entry)| -> Result<DecomposedEntry, DecomposeError> {
            let request = entry.request.ok_or_else(|| {
                ParseError::missing_element(format!("Bundle.entry[{index}].request"))
            })?;
            let method_path = || format!("Bundle.entry[{index}].request.method");
            let verb = match (request.verb(), request.method.as_deref()) {
                (Some(verb), _) => verb,
                (None, Some(code)) => {
                    return Err(ParseError::invalid_element(
                        method_path(),
                        format!("unknown HTTP verb '{code}'"),
                    )
                    .into());
                }
                (None, None) => return Err(ParseError::missing_element(method_path()).into()),
            };
            if verb != HttpVerb::Get && entry.resource.is_none() {
                return Err(DecomposeError::missing_entry_resource(index, verb));
            }
            Ok(DecomposedEntry {
                index,
                verb,
                url: request.url,
                resource: entry.resource,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(entries = entries.len(), "decomposed transaction bundle");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecomposeErrorKind;
    use crate::model::{BundleEntry, BundleEntryRequest, BundleType, GenericResource};
    use fhirgate_core::ResourceType;

    fn entry(method: HttpVerb, resource: Option<Resource>) -> BundleEntry {
        raw_entry(Some(method.as_str()), resource)
    }

    fn raw_entry(method: Option<&str>, resource: Option<Resource>) -> BundleEntry {
        BundleEntry {
            full_url: None,
            request: Some(BundleEntryRequest {
                method: method.map(str::to_string),
                url: None,
            }),
            resource,
        }
    }

    fn observation() -> Resource {
        Resource::Other(GenericResource {
            resource_type: ResourceType::Observation,
            id: None,
            content: serde_json::Map::new(),
        })
    }

    fn transaction(entry: Vec<BundleEntry>) -> Bundle {
        Bundle {
            id: None,
            bundle_type: Some(BundleType::Transaction),
            entry,
        }
    }

    #[test]
    fn empty_transaction_yields_no_entries() {
        assert!(decompose_bundle(transaction(vec![])).unwrap().is_empty());
    }

    #[test]
    fn non_transaction_types_are_rejected_before_entries_are_read() {
        let bundle_types = [
            None,
            Some(BundleType::Batch),
            Some(BundleType::Document),
            Some(BundleType::Unknown("Transaction".into())),
        ];
        for bundle_type in bundle_types {
            let bundle = Bundle {
                id: None,
                bundle_type,
                // each entry would fail its own checks if it were inspected
                entry: vec![
                    entry(HttpVerb::Post, None),
                    raw_entry(Some("OPTIONS"), None),
                    raw_entry(None, None),
                    BundleEntry::default(),
                ],
            };
            let err = decompose_bundle(bundle).unwrap_err();
            assert_eq!(err.kind(), DecomposeErrorKind::UnsupportedBundleType);
        }
    }

    #[test]
    fn transaction_entries_need_a_known_verb() {
        let err = decompose_bundle(transaction(vec![
            entry(HttpVerb::Get, None),
            raw_entry(Some("OPTIONS"), Some(observation())),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), DecomposeErrorKind::MalformedPayload);
        assert_eq!(
            err.to_operation_outcome().issue[0].expression,
            vec!["Bundle.entry[1].request.method"]
        );

        let err =
            decompose_bundle(transaction(vec![raw_entry(None, Some(observation()))])).unwrap_err();
        assert_eq!(err.kind(), DecomposeErrorKind::MalformedPayload);
        assert!(err.to_string().contains("Bundle.entry[0].request.method"));
    }

    #[test]
    fn every_mutating_verb_requires_a_resource() {
        for verb in [
            HttpVerb::Post,
            HttpVerb::Put,
            HttpVerb::Patch,
            HttpVerb::Delete,
            HttpVerb::Head,
        ] {
            let err = decompose_bundle(transaction(vec![
                entry(HttpVerb::Get, None),
                entry(verb, None),
            ]))
            .unwrap_err();
            assert!(matches!(
                err,
                DecomposeError::MissingEntryResource { index: 1, verb: v } if v == verb
            ));
        }
    }

    #[test]
    fn get_entries_may_carry_a_resource() {
        let entries =
            decompose_bundle(transaction(vec![entry(HttpVerb::Get, Some(observation()))])).unwrap();
        assert_eq!(entries[0].resource, Some(observation()));
    }

    #[test]
    fn entries_without_request_are_malformed() {
        let bundle = transaction(vec![BundleEntry {
            full_url: None,
            request: None,
            resource: Some(observation()),
        }]);
        let err = decompose_bundle(bundle).unwrap_err();
        assert_eq!(err.kind(), DecomposeErrorKind::MalformedPayload);
        assert_eq!(
            err.to_operation_outcome().issue[0].expression,
            vec!["Bundle.entry[0].request"]
        );
    }

    #[test]
    fn decomposer_clones_share_the_parser() {
        let decomposer: BundleDecomposer = BundleDecomposer::default();
        let clone = decomposer.clone();
        assert!(std::ptr::eq(decomposer.parser(), clone.parser()));
    }
}
