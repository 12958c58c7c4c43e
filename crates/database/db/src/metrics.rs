use metrics::Histogram;
use metrics_derive::Metrics;

/// The metrics for the [`super::Database`].
#[derive(Metrics, Clone)]
#[metrics(scope = "dtl_database")]
pub(crate) struct DatabaseMetrics {
    /// Time (ms) to acquire the DB write lock.
    #[metric(describe = "Time to acquire the database write lock (ms)")]
    pub(crate) write_lock_acquire_duration: Histogram,
}
