//! Request Context: the payload and declared encoding of one inbound call.

/// Supplies the raw body of a single request.
///
/// Implementations hand out borrowed bytes so repeated calls over the same
/// request see identical input.
pub trait RequestContext {
    fn load_payload_bytes(&self) -> &[u8];

    /// Declared character encoding, `None` when the caller did not state one.
    fn encoding(&self) -> Option<&str>;
}

impl<T: RequestContext + ?Sized> RequestContext for &T {
    fn load_payload_bytes(&self) -> &[u8] {
        (**self).load_payload_bytes()
    }

    fn encoding(&self) -> Option<&str> {
        (**self).encoding()
    }
}

/// A request whose body is already in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryRequest {
    payload: Vec<u8>,
    encoding: Option<String>,
}

impl InMemoryRequest {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            encoding: None,
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Build a request from a body and its `Content-Type` header value. The
    /// `charset` parameter, when present, becomes the declared encoding.
    pub fn from_content_type(payload: impl Into<Vec<u8>>, content_type: &str) -> Self {
        Self {
            payload: payload.into(),
            encoding: charset_param(content_type).map(str::to_string),
        }
    }
}

impl RequestContext for InMemoryRequest {
    fn load_payload_bytes(&self) -> &[u8] {
        &self.payload
    }

    fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }
}

/// Extract the `charset` parameter from a media type such as
/// `application/fhir+json; charset=UTF-8`.
pub fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then_some(value)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_param_parsing() {
        assert_eq!(
            charset_param("application/fhir+json; charset=UTF-8"),
            Some("UTF-8")
        );
        assert_eq!(
            charset_param("application/json;fhirVersion=4.0;Charset=\"iso-8859-1\""),
            Some("iso-8859-1")
        );
        assert_eq!(charset_param("application/fhir+json"), None);
        assert_eq!(charset_param("application/fhir+json; charset="), None);
        assert_eq!(charset_param("charset=utf-8"), None);
    }

    #[test]
    fn in_memory_request_exposes_payload_and_encoding() {
        let request = InMemoryRequest::new("{}");
        assert_eq!(request.load_payload_bytes(), b"{}");
        assert_eq!(request.encoding(), None);

        let request = request.with_encoding("UTF-16LE");
        assert_eq!(request.encoding(), Some("UTF-16LE"));

        let request = InMemoryRequest::from_content_type(
            vec![0x7B, 0x7D],
            "application/fhir+json; charset=utf-8",
        );
        assert_eq!(request.encoding(), Some("utf-8"));
    }

    #[test]
    fn references_are_request_contexts() {
        fn payload_len(request: impl RequestContext) -> usize {
            request.load_payload_bytes().len()
        }
        let request = InMemoryRequest::new("abc");
        assert_eq!(payload_len(&request), 3);
        assert_eq!(payload_len(&request), 3);
    }
}
