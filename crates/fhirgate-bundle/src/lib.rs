//! Decomposition of FHIR `transaction` Bundles for the gateway.
//!
//! An inbound request body is decoded, parsed into a [`Resource`] tree and,
//! when it is a transaction Bundle, split into one [`DecomposedEntry`] per
//! `Bundle.entry` so that authorization and routing can look at each
//! operation on its own.
//!
//! ```text
//! RequestContext ──▶ Charset::decode ──▶ ResourceParser ──▶ Resource
//!                                                             │
//!                                  Bundle(type=transaction) ◀─┘
//!                                                             │
//!                                        Vec<DecomposedEntry> ◀┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fhirgate_bundle::{BundleDecomposer, HttpVerb, InMemoryRequest, JsonResourceParser};
//!
//! let decomposer = BundleDecomposer::new(Arc::new(JsonResourceParser::default()));
//! let request = InMemoryRequest::new(
//!     r#"{"resourceType":"Bundle","type":"transaction","entry":[
//!         {"request":{"method":"PUT","url":"Patient/p1"},
//!          "resource":{"resourceType":"Patient","id":"p1"}},
//!         {"request":{"method":"GET","url":"Patient/p1"}}]}"#,
//! );
//!
//! let entries = decomposer.find_resources_in_bundle(&request).unwrap();
//! assert_eq!(entries[0].verb, HttpVerb::Put);
//! assert_eq!(entries[0].resource.as_ref().unwrap().reference(), "Patient/p1");
//! assert_eq!(entries[1].verb, HttpVerb::Get);
//! assert!(entries[1].resource.is_none());
//! ```

pub mod decomposer;
pub mod error;
pub mod model;
pub mod parser;
pub mod request;

pub use decomposer::{BundleDecomposer, DecomposedEntry, decompose_bundle};
pub use error::{DecomposeError, DecomposeErrorKind, ParseError, PayloadError};
pub use model::{
    Bundle, BundleEntry, BundleEntryRequest, BundleType, GenericResource, HttpVerb, Resource,
};
pub use parser::{DEFAULT_MAX_DEPTH, JsonResourceParser, ResourceParser};
pub use request::{InMemoryRequest, RequestContext, charset_param};
