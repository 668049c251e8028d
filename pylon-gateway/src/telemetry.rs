//! Tracing subscriber setup.
//!
//! `RUST_LOG` controls filtering; defaults to `info`. Safe to call more
//! than once; later calls keep the first subscriber.

use tracing_subscriber::EnvFilter;

/// Initialize human-readable log output.
pub fn init() {
    init_with_json(false);
}

/// Initialize log output, optionally as JSON lines for ingestion.
pub fn init_with_json(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    // Already-initialized is fine.
    drop(result);
}
