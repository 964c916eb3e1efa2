//! Connection pool for the resource store.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use resdao_core::config::DatabaseConfig;
use resdao_core::result::AppResult;

use crate::error::store_error;
use crate::migration;
use crate::repositories::PgResourceInfoDao;

/// Readiness of the resource store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHealth {
    /// Whether the `resource_info` table exists.
    pub schema_ready: bool,
    /// Stored resources across all tenants, once the schema exists.
    pub resource_count: Option<i64>,
}

/// PostgreSQL pool shared by the resource DAO and the migration runner.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool and wait for the first connection.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            "Connecting to resource store"
        );

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(store_error("Failed to connect to database"))?;

        info!("Resource store connected");
        Ok(Self { pool })
    }

    /// Open a pool that connects on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = pool_options(config)
            .connect_lazy(&config.url)
            .map_err(store_error("Invalid database URL"))?;
        Ok(Self { pool })
    }

    /// Underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Resource DAO sharing this pool.
    pub fn resource_dao(&self) -> PgResourceInfoDao {
        PgResourceInfoDao::new(self.pool.clone())
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> AppResult<()> {
        migration::run_migrations(&self.pool).await
    }

    /// Check that the store answers and the resource schema is in place.
    pub async fn health_check(&self) -> AppResult<StoreHealth> {
        let schema_ready =
            sqlx::query_scalar::<_, bool>("SELECT to_regclass('resource_info') IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(store_error("Health check failed"))?;

        if !schema_ready {
            warn!("resource_info table is missing; run `resdao migrate run`");
            return Ok(StoreHealth {
                schema_ready,
                resource_count: None,
            });
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resource_info")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("Health check failed"))?;

        Ok(StoreHealth {
            schema_ready,
            resource_count: Some(count),
        })
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Resource store pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

/// Hide the password of a database URL before it is logged.
fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map_or(0, |p| p + 3);
    let Some(at) = url.rfind('@').filter(|&at| at > scheme_end) else {
        return url.to_string();
    };
    match url[scheme_end..at].find(':') {
        Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at..]),
        None => url.to_string(),
    }
}
