pub mod config;
pub mod decompose;

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use fhirgate_bundle::{InMemoryRequest, RequestContext};

use crate::cli::PayloadArgs;
use crate::config::AppConfig;

fn read_payload(file: &Option<String>) -> Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read file: {path}")),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

/// Encoding precedence: `--encoding`, then the `--content-type` charset, then
/// `request.default_encoding` from the configuration.
pub fn build_request(args: &PayloadArgs, config: &AppConfig) -> Result<InMemoryRequest> {
    let payload = read_payload(&args.file)?;
    Ok(request_for(payload, args, config))
}

fn request_for(payload: Vec<u8>, args: &PayloadArgs, config: &AppConfig) -> InMemoryRequest {
    let request = match &args.content_type {
        Some(content_type) => InMemoryRequest::from_content_type(payload, content_type),
        None => InMemoryRequest::new(payload),
    };
    if let Some(encoding) = &args.encoding {
        return request.with_encoding(encoding.clone());
    }
    let declared = request.encoding().is_some();
    match &config.request.default_encoding {
        Some(default) if !declared => request.with_encoding(default.clone()),
        _ => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(encoding: Option<&str>, content_type: Option<&str>) -> PayloadArgs {
        PayloadArgs {
            file: None,
            encoding: encoding.map(str::to_string),
            content_type: content_type.map(str::to_string),
        }
    }

    #[test]
    fn encoding_precedence() {
        let mut config = AppConfig::default();
        config.request.default_encoding = Some("iso-8859-1".into());
        let json_utf8 = Some("application/json; charset=utf-8");

        let req = request_for(b"{}".to_vec(), &args(Some("utf-16le"), json_utf8), &config);
        assert_eq!(req.encoding(), Some("utf-16le"));

        let req = request_for(b"{}".to_vec(), &args(None, json_utf8), &config);
        assert_eq!(req.encoding(), Some("utf-8"));

        let fhir_json = Some("application/fhir+json");
        let req = request_for(b"{}".to_vec(), &args(None, fhir_json), &config);
        assert_eq!(req.encoding(), Some("iso-8859-1"));

        let req = request_for(b"{}".to_vec(), &args(None, None), &AppConfig::default());
        assert_eq!(req.encoding(), None);
    }

    #[test]
    fn reads_payload_from_file() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(file.path(), [0x7B, 0xEB, 0x7D]).expect("write");
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(read_payload(&Some(path)).unwrap(), vec![0x7B, 0xEB, 0x7D]);
        assert!(read_payload(&Some("/nonexistent/payload.json".into())).is_err());
    }
}
