//! Operational constants.
//!
//! Fixed tuning values that are not expected to vary per deployment; anything
//! deployment-specific has an env-var override in the matching config type.

/// Default number of records per page when `pageSize` is not supplied.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of open connections in the database pool.
pub const DB_MAX_POOL_SIZE: usize = 100;

/// Database connection acquisition timeout, in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// How often the view-refresh scheduler fires, in seconds (4 hours).
pub const VIEW_REFRESH_INTERVAL_SECS: u64 = 4 * 3600;

/// Script that rebuilds the statistics materialized views.
pub const STATS_REFRESH_SCRIPT: &str = "sql/views/refresh_mv_stats.sql";

/// Script that rebuilds the per-table aggregation views.
pub const TABLES_REFRESH_SCRIPT: &str = "sql/views/refresh_all_tables.sql";
