//! View Refresh Background Task
//!
//! Re-runs the two materialized-view refresh scripts on a fixed four-hour
//! cadence, starting immediately at spawn:
//!
//! - the statistics script rebuilds the aggregated stats views
//! - the tables script rebuilds the per-table aggregation views
//!
//! Scripts are read from disk on every run, so an operator can change a
//! refresh script without restarting the server. One job failing (missing
//! file, SQL error) is logged and counted; it never stops the other job or
//! later runs.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::constants::{STATS_REFRESH_SCRIPT, TABLES_REFRESH_SCRIPT, VIEW_REFRESH_INTERVAL_SECS};
use crate::db::DbClient;
use crate::error::ApiResult;

// ============================================================================
// SCRIPT RUNNER
// ============================================================================

/// Executes a refresh script's SQL. Implemented by `DbClient` in production;
/// tests substitute a recording runner.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn execute_script(&self, sql: &str) -> ApiResult<()>;
}

#[async_trait]
impl ScriptRunner for DbClient {
    async fn execute_script(&self, sql: &str) -> ApiResult<()> {
        self.batch_execute(sql).await
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the view refresh task.
#[derive(Debug, Clone)]
pub struct ViewRefreshConfig {
    /// How often to run the refresh scripts (default: 4 hours)
    pub interval: Duration,

    /// Path to the statistics refresh script
    pub stats_script: PathBuf,

    /// Path to the per-table refresh script
    pub tables_script: PathBuf,
}

impl Default for ViewRefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(VIEW_REFRESH_INTERVAL_SECS),
            stats_script: PathBuf::from(STATS_REFRESH_SCRIPT),
            tables_script: PathBuf::from(TABLES_REFRESH_SCRIPT),
        }
    }
}

impl ViewRefreshConfig {
    /// Create ViewRefreshConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CONVOY_REFRESH_INTERVAL_SECS`: Refresh cadence (default: 14400)
    /// - `CONVOY_REFRESH_STATS_SCRIPT`: Stats script path
    /// - `CONVOY_REFRESH_TABLES_SCRIPT`: Tables script path
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            interval: Duration::from_secs(
                std::env::var("CONVOY_REFRESH_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(VIEW_REFRESH_INTERVAL_SECS),
            ),
            stats_script: std::env::var("CONVOY_REFRESH_STATS_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or(defaults.stats_script),
            tables_script: std::env::var("CONVOY_REFRESH_TABLES_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or(defaults.tables_script),
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters for view refresh activity.
#[derive(Debug, Default)]
pub struct ViewRefreshMetrics {
    /// Refresh cycles started since startup
    pub ticks: AtomicU64,

    /// Successful stats script runs
    pub stats_runs: AtomicU64,

    /// Failed stats script runs
    pub stats_failures: AtomicU64,

    /// Successful tables script runs
    pub tables_runs: AtomicU64,

    /// Failed tables script runs
    pub tables_failures: AtomicU64,
}

impl ViewRefreshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all counters.
    pub fn snapshot(&self) -> ViewRefreshSnapshot {
        ViewRefreshSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            stats_runs: self.stats_runs.load(Ordering::Relaxed),
            stats_failures: self.stats_failures.load(Ordering::Relaxed),
            tables_runs: self.tables_runs.load(Ordering::Relaxed),
            tables_failures: self.tables_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of refresh metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRefreshSnapshot {
    pub ticks: u64,
    pub stats_runs: u64,
    pub stats_failures: u64,
    pub tables_runs: u64,
    pub tables_failures: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Run one script end to end: read it fresh from disk, then execute it.
/// Returns whether the run succeeded; failures are logged here.
async fn run_job<R: ScriptRunner>(runner: &R, script: &Path, job: &'static str) -> bool {
    let sql = match tokio::fs::read_to_string(script).await {
        Ok(sql) => sql,
        Err(e) => {
            tracing::error!(job, script = %script.display(), "Failed to read refresh script: {}", e);
            return false;
        }
    };

    match runner.execute_script(&sql).await {
        Ok(()) => {
            tracing::info!(job, script = %script.display(), "View refresh completed");
            true
        }
        Err(e) => {
            tracing::error!(job, script = %script.display(), "View refresh failed: {}", e);
            false
        }
    }
}

/// Background task that periodically refreshes the materialized views.
///
/// The first run happens immediately at spawn; later runs fire every
/// `config.interval`. Runs until the shutdown signal is received, then
/// returns its metrics handle.
pub async fn view_refresh_task<R: ScriptRunner>(
    runner: Arc<R>,
    config: ViewRefreshConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<ViewRefreshMetrics> {
    let metrics = Arc::new(ViewRefreshMetrics::new());

    // First tick fires immediately.
    let mut refresh_interval = interval(config.interval);
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        interval_secs = config.interval.as_secs(),
        stats_script = %config.stats_script.display(),
        tables_script = %config.tables_script.display(),
        "View refresh task started"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("View refresh task shutting down");
                    break;
                }
            }

            _ = refresh_interval.tick() => {
                metrics.ticks.fetch_add(1, Ordering::Relaxed);

                let cycle = async {
                    if run_job(runner.as_ref(), &config.stats_script, "stats").await {
                        metrics.stats_runs.fetch_add(1, Ordering::Relaxed);
                    } else {
                        metrics.stats_failures.fetch_add(1, Ordering::Relaxed);
                    }

                    if run_job(runner.as_ref(), &config.tables_script, "tables").await {
                        metrics.tables_runs.fetch_add(1, Ordering::Relaxed);
                    } else {
                        metrics.tables_failures.fetch_add(1, Ordering::Relaxed);
                    }
                };

                // Shutdown cancels an in-flight cycle at its next await point
                // instead of waiting the cycle out. `wait_for` completes only
                // on a true value (or a dropped sender), so a spurious watch
                // send does not abort the cycle.
                tokio::select! {
                    _ = cycle => {}
                    _ = shutdown_rx.wait_for(|stop| *stop) => {
                        tracing::info!("View refresh task shutting down");
                        break;
                    }
                }
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        ticks = snapshot.ticks,
        stats_runs = snapshot.stats_runs,
        stats_failures = snapshot.stats_failures,
        tables_runs = snapshot.tables_runs,
        tables_failures = snapshot.tables_failures,
        "View refresh task stopped"
    );

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    use crate::error::ApiError;

    /// Recording runner. Fails the runs whose zero-based index is listed in
    /// `fail_indices`; stores the SQL of every attempted execution.
    struct MockRunner {
        executed: Mutex<Vec<String>>,
        fail_indices: Vec<u64>,
        calls: AtomicU64,
        job_duration: Duration,
    }

    impl MockRunner {
        fn new(fail_indices: Vec<u64>) -> Self {
            Self {
                executed: Mutex::new(Vec::new()),
                fail_indices,
                calls: AtomicU64::new(0),
                job_duration: Duration::ZERO,
            }
        }

        fn with_job_duration(mut self, job_duration: Duration) -> Self {
            self.job_duration = job_duration;
            self
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScriptRunner for MockRunner {
        async fn execute_script(&self, sql: &str) -> ApiResult<()> {
            if !self.job_duration.is_zero() {
                tokio::time::sleep(self.job_duration).await;
            }

            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            self.executed.lock().unwrap().push(sql.to_string());

            if self.fail_indices.contains(&index) {
                Err(ApiError::database_error("refresh failed"))
            } else {
                Ok(())
            }
        }
    }

    fn write_script(dir: &tempfile::TempDir, name: &str, sql: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(sql.as_bytes()).unwrap();
        path
    }

    fn test_config(dir: &tempfile::TempDir, interval: Duration) -> ViewRefreshConfig {
        ViewRefreshConfig {
            interval,
            stats_script: write_script(dir, "stats.sql", "REFRESH MATERIALIZED VIEW mv_stats"),
            tables_script: write_script(dir, "tables.sql", "REFRESH MATERIALIZED VIEW mv_tables"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ViewRefreshConfig::default();
        assert_eq!(config.interval, Duration::from_secs(4 * 3600));
        assert_eq!(config.stats_script, PathBuf::from(STATS_REFRESH_SCRIPT));
        assert_eq!(config.tables_script, PathBuf::from(TABLES_REFRESH_SCRIPT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_jobs_run_immediately_at_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockRunner::new(vec![]));
        let config = test_config(&dir, Duration::from_secs(3600));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(view_refresh_task(Arc::clone(&runner), config, shutdown_rx));

        // Let the first tick run without advancing past the interval.
        tokio::time::sleep(Duration::from_millis(1)).await;

        shutdown_tx.send(true).unwrap();
        let metrics = handle.await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 1);
        assert_eq!(snapshot.stats_runs, 1);
        assert_eq!(snapshot.tables_runs, 1);
        assert_eq!(snapshot.stats_failures, 0);

        let executed = runner.executed();
        assert_eq!(executed.len(), 2);
        assert!(executed[0].contains("mv_stats"));
        assert!(executed[1].contains("mv_tables"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_other_job_or_later_runs() {
        let dir = tempfile::tempdir().unwrap();
        // Fail the stats run of the second cycle (executions 0,1 are cycle
        // one; execution 2 is the second cycle's stats run).
        let runner = Arc::new(MockRunner::new(vec![2]));
        let config = test_config(&dir, Duration::from_secs(3600));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(view_refresh_task(Arc::clone(&runner), config, shutdown_rx));

        // Three cycles: t=0, t=1h, t=2h.
        tokio::time::sleep(Duration::from_millis(1)).await;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        tokio::time::sleep(Duration::from_secs(3600)).await;

        shutdown_tx.send(true).unwrap();
        let metrics = handle.await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 3);
        assert_eq!(snapshot.stats_failures, 1);
        assert_eq!(snapshot.stats_runs, 2);
        // The tables job ran in every cycle, including the failing one.
        assert_eq!(snapshot.tables_runs, 3);
        assert_eq!(snapshot.tables_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripts_are_reread_each_run() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockRunner::new(vec![]));
        let config = test_config(&dir, Duration::from_secs(3600));
        let stats_path = config.stats_script.clone();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(view_refresh_task(Arc::clone(&runner), config, shutdown_rx));

        tokio::time::sleep(Duration::from_millis(1)).await;

        // Edit the script between cycles.
        std::fs::write(&stats_path, "REFRESH MATERIALIZED VIEW mv_stats_v2").unwrap();
        tokio::time::sleep(Duration::from_secs(3600)).await;

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let executed = runner.executed();
        assert_eq!(executed.len(), 4);
        assert!(executed[0].contains("mv_stats"));
        assert!(executed[2].contains("mv_stats_v2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spurious_watch_send_does_not_cancel_cycle() {
        let dir = tempfile::tempdir().unwrap();
        // Slow jobs so the watch value changes while a cycle is in flight.
        let runner = Arc::new(
            MockRunner::new(vec![]).with_job_duration(Duration::from_secs(10)),
        );
        let config = test_config(&dir, Duration::from_secs(3600));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(view_refresh_task(Arc::clone(&runner), config, shutdown_rx));

        // Cycle starts at t=0 with the stats job sleeping.
        tokio::time::sleep(Duration::from_millis(1)).await;

        // A non-shutdown watch write must leave the cycle running.
        shutdown_tx.send(false).unwrap();
        tokio::time::sleep(Duration::from_secs(25)).await;

        shutdown_tx.send(true).unwrap();
        let metrics = handle.await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 1);
        assert_eq!(snapshot.stats_runs, 1);
        assert_eq!(snapshot.tables_runs, 1);
        assert_eq!(runner.executed().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_script_is_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockRunner::new(vec![]));
        let mut config = test_config(&dir, Duration::from_secs(3600));
        config.stats_script = dir.path().join("does_not_exist.sql");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(view_refresh_task(Arc::clone(&runner), config, shutdown_rx));

        tokio::time::sleep(Duration::from_millis(1)).await;

        shutdown_tx.send(true).unwrap();
        let metrics = handle.await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.stats_failures, 1);
        // The tables job still ran.
        assert_eq!(snapshot.tables_runs, 1);
        assert_eq!(runner.executed().len(), 1);
    }
}
