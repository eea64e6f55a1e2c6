//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter directive for the configured level; `verbose` forces debug
#[must_use]
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("travelmate={level},warn")
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second init (e.g. in tests) keeps the first subscriber
    let result = if config.format == "json" {
        subscriber.json().try_init()
    } else {
        subscriber.pretty().try_init()
    };
    if let Err(e) = result {
        tracing::debug!("Tracing subscriber already installed: {}", e);
    }
}
