//! # Metrics Traits
//!
//! Recording and snapshotting are separate responsibilities: the cache core
//! only writes counters through [`CoreMetricsRecorder`], and readers take a
//! copy through [`MetricsSnapshotProvider`].
//!
//! ```text
//!   LruCore ──record_*──► LruMetrics ──snapshot()──► LruMetricsSnapshot
//! ```

/// Counters every cache core records.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
}

/// Snapshot metrics for tests and benchmarks.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
