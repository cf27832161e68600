use fhirgate_bundle::DEFAULT_MAX_DEPTH;
use fhirgate_core::{Charset, FhirVersion};
use serde::{Deserialize, Serialize};

use crate::observability::DEFAULT_LOG_LEVEL;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub fhir: FhirSettings,
    #[serde(default)]
    pub parser: ParserSettings,
    #[serde(default)]
    pub request: RequestSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // FHIR version validation
        if self.fhir.version.parse::<FhirVersion>().is_err() {
            return Err("fhir.version must be one of R4, R4B, R5".into());
        }
        // Parser validation
        if self.parser.max_depth == 0 {
            return Err("parser.max_depth must be > 0".into());
        }
        // Request validation
        if let Some(encoding) = &self.request.default_encoding {
            Charset::from_label(encoding)
                .map_err(|e| format!("request.default_encoding: {e}"))?;
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    /// Parsed FHIR version. Falls back to R4 for values `validate` would reject.
    pub fn fhir_version(&self) -> FhirVersion {
        self.fhir.version.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirSettings {
    #[serde(default = "default_fhir_version")]
    pub version: String,
}

fn default_fhir_version() -> String {
    "R4".into()
}

impl Default for FhirSettings {
    fn default() -> Self {
        Self {
            version: default_fhir_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Maximum Bundle-in-Bundle nesting accepted by the parser
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RequestSettings {
    /// Encoding assumed for payloads that declare none. Unset means UTF-8.
    #[serde(default)]
    pub default_encoding: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "fhirgate.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                // Try default file in the working directory
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., FHIRGATE__PARSER__MAX_DEPTH=4
        builder = builder.add_source(
            Environment::with_prefix("FHIRGATE")
                .prefix_separator("__")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
