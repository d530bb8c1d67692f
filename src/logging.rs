//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over `[log] level`. With `[log] json = true`
//! events are emitted as JSON lines for log aggregation; otherwise the
//! human-readable formatter is used. Output always goes to stderr so that
//! CLI output on stdout stays clean.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},sqlx=warn,tower_http={level}",
            level = log.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    let result = if log.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(level = %log.level, json = log.json, "tracing initialized");
    }
}
