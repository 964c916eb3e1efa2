//! Database migration commands.

use clap::{Args, Subcommand};

use crate::output;
use resdao_core::error::AppError;
use resdao_database::DatabasePool;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database answers and the schema is applied
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, pool: &DatabasePool) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            pool.migrate().await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            let health = pool.health_check().await?;
            output::print_kv("database", "reachable");
            output::print_kv(
                "schema",
                if health.schema_ready { "ready" } else { "missing, run `resdao migrate run`" },
            );
            if let Some(count) = health.resource_count {
                output::print_kv("resources", &count.to_string());
            }
        }
    }

    Ok(())
}
