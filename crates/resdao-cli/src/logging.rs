//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use resdao_core::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // Logs go to stderr so that command output on stdout stays parseable.
    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
}
