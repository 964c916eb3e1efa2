//! CLI command definitions and dispatch.

pub mod migrate;
pub mod resource;

use clap::{Parser, Subcommand};

use crate::logging;
use crate::output::OutputFormat;
use resdao_core::config::AppConfig;
use resdao_core::error::AppError;
use resdao_database::DatabasePool;

/// ResDao: tenant resource repository administration
#[derive(Debug, Parser)]
#[command(name = "resdao", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `config/<env>.toml`
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Resource management
    Resource(resource::ResourceArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config, self.env.as_deref())?;
        logging::init(&config.logging);

        tracing::debug!(command = ?self.command, "Executing command");

        let pool = DatabasePool::connect(&config.database).await?;
        let result = match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &pool).await,
            Commands::Resource(args) => resource::execute(args, &pool, self.format).await,
        };
        pool.close().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_command() {
        let cli = Cli::try_parse_from([
            "resdao",
            "--format",
            "json",
            "resource",
            "list",
            "--tenant",
            "5f0c1f8e-8a43-4a3e-9d8f-1e2a4f6b7c8d",
            "--search",
            "sensor",
            "--sort",
            "title",
            "--desc",
        ])
        .expect("parse");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Resource(_)));
    }

    #[test]
    fn test_malformed_tenant_rejected_at_parse() {
        let result = Cli::try_parse_from([
            "resdao", "resource", "list", "--tenant", "not-a-uuid",
        ]);
        assert!(result.is_err());
    }
}
