//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling via deadpool-postgres, plus the startup
//! schema auto-create step that turns the registered entity descriptors into
//! `CREATE TABLE IF NOT EXISTS` statements.

use std::time::Duration;

use convoy_core::{ColumnInfo, TableDescriptor};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use crate::constants::{DB_CONNECT_TIMEOUT_SECS, DB_MAX_POOL_SIZE};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "convoy".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: DB_MAX_POOL_SIZE,
            timeout: Duration::from_secs(DB_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CONVOY_DB_HOST` (default: localhost)
    /// - `CONVOY_DB_PORT` (default: 5432)
    /// - `CONVOY_DB_NAME` (default: convoy)
    /// - `CONVOY_DB_USER` (default: postgres)
    /// - `CONVOY_DB_PASSWORD` (default: empty)
    /// - `CONVOY_DB_POOL_SIZE` (default: 100)
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("CONVOY_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("CONVOY_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("CONVOY_DB_NAME").unwrap_or_else(|_| "convoy".to_string()),
            user: std::env::var("CONVOY_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("CONVOY_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("CONVOY_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DB_MAX_POOL_SIZE),
            timeout: Duration::from_secs(
                std::env::var("CONVOY_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DB_CONNECT_TIMEOUT_SECS),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        pool.resize(self.max_size);

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client wrapping the connection pool.
///
/// This is the only type in the crate that talks to PostgreSQL directly;
/// everything above it goes through the [`EntityStore`](crate::store::EntityStore)
/// seam or the script-execution methods here.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        let status = self.pool.status();
        status.size
    }

    /// Get a connection from the pool.
    pub(crate) async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Execute a raw SQL batch (used by the view-refresh scheduler).
    pub async fn batch_execute(&self, sql: &str) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(sql).await?;
        Ok(())
    }

    /// Verify pool connectivity with a trivial query.
    pub async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    /// Auto-create every registered table from its descriptor.
    ///
    /// Idempotent (`CREATE TABLE IF NOT EXISTS`); a failure here is fatal to
    /// startup. Existing tables are left untouched, so renames and column
    /// changes require a real migration.
    pub async fn ensure_schema(&self, tables: &[TableDescriptor]) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        for table in tables {
            conn.batch_execute(&create_table_sql(table)).await?;
            tracing::debug!(table = table.name, "Schema verified");
        }
        tracing::info!(tables = tables.len(), "Schema auto-create completed");
        Ok(())
    }
}

// ============================================================================
// SCHEMA GENERATION
// ============================================================================

fn column_def(column: &ColumnInfo) -> String {
    if column.primary_key {
        // Store-assigned keys: inserts may omit the id and let the identity
        // column assign it.
        format!(
            "{} BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
            column.name
        )
    } else {
        format!("{} {}", column.name, column.kind.sql_type())
    }
}

/// Render the `CREATE TABLE IF NOT EXISTS` statement for a descriptor.
pub fn create_table_sql(table: &TableDescriptor) -> String {
    let columns = table
        .columns
        .iter()
        .map(column_def)
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TABLE IF NOT EXISTS {} ({})", table.name, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_core::models::ContentWalletLogs;
    use convoy_core::{Entity, ALL_TABLES};

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "convoy");
        assert_eq!(config.max_size, DB_MAX_POOL_SIZE);
    }

    #[test]
    fn test_create_table_sql_shape() {
        let sql = create_table_sql(&ContentWalletLogs::TABLE);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS content_wallet_logs ("));
        assert!(sql.contains("id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"));
        assert!(sql.contains("wallet TEXT"));
        assert!(sql.contains("created_at TIMESTAMPTZ"));
        assert!(sql.contains("wallet_id BIGINT"));
    }

    #[test]
    fn test_create_table_sql_renders_for_all_tables() {
        for table in ALL_TABLES {
            let sql = create_table_sql(table);
            assert!(sql.contains(table.name), "table {}", table.name);
            // One column definition per declared column.
            assert_eq!(
                sql.matches(", ").count() + 1,
                table.columns.len(),
                "table {}",
                table.name
            );
        }
    }
}
