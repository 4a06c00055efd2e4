//! Background Jobs
//!
//! Periodic tasks spawned during server startup:
//!
//! - `view_refresh`: re-runs the materialized-view refresh scripts every
//!   four hours
//!
//! Jobs take a `watch` shutdown receiver and return their metrics handle:
//!
//! ```ignore
//! use convoy_api::jobs::{view_refresh_task, ViewRefreshConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(view_refresh_task(runner, ViewRefreshConfig::from_env(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod view_refresh;

pub use view_refresh::{
    view_refresh_task, ScriptRunner, ViewRefreshConfig, ViewRefreshMetrics, ViewRefreshSnapshot,
};
