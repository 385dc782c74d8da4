//! Tracing initialization with a configurable and reloadable log level.
//!
//! The token store itself only emits `tracing` spans and events; hosts that
//! do not install a subscriber get no output.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

/// Installs the global subscriber at `info` level.
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Installs the global subscriber using the logging configuration.
pub fn init_tracing_from_config(config: &LoggingConfig) {
    init_tracing_with_level(&config.level);
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `level` when it is set and parses. Installing twice
/// is a no-op.
pub fn init_tracing_with_level(level: &str) {
    let (reload_layer, handle) = reload::Layer::new(build_filter(level));
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Applies a new log level at runtime if the subscriber was installed here.
///
/// Returns `false` when there is nothing to reload.
pub fn apply_logging_level(level: &str) -> bool {
    match LOG_RELOAD_HANDLE.get() {
        Some(handle) => handle
            .modify(|f| {
                *f = EnvFilter::new(level);
            })
            .is_ok(),
        None => false,
    }
}

fn build_filter(level: &str) -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

/// Shortens a token for log output.
///
/// Tokens are bearer credentials; only a short prefix is ever logged.
#[must_use]
pub fn token_prefix(token: &str) -> &str {
    token
        .char_indices()
        .nth(8)
        .map_or(token, |(idx, _)| &token[..idx])
}
