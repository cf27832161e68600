//! Log output for the CLI. Everything goes to stderr so stdout stays
//! machine-readable; the level starts at [`DEFAULT_LOG_LEVEL`] and is swapped
//! for `logging.level` once the configuration has been loaded.
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static FILTER: OnceLock<FilterHandle> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` wins over every configured level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let (filter, handle) = reload::Layer::new(filter);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
    if installed.is_ok() {
        let _ = FILTER.set(handle);
    }
}

/// Switch to the configured level unless `RUST_LOG` is in charge.
pub fn apply_logging_level(level: &str) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    if let Some(handle) = FILTER.get() {
        let _ = handle.reload(EnvFilter::new(level));
    }
}
