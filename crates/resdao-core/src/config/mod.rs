//! Application configuration schemas.
//!
//! Configuration is merged from TOML files and `RESDAO__*` environment
//! variables via the `config` crate.

pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Prefix of environment variables that override file settings.
const ENV_PREFIX: &str = "RESDAO";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Sources, later ones winning: the file at `path` (extension optional),
    /// `config/{env}` when `env` is given, then environment variables such
    /// as `RESDAO__DATABASE__URL`.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        debug!(path, env, "Configuration sources merged");

        Ok(config.try_deserialize()?)
    }
}
