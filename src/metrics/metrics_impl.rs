use crate::metrics::traits::CoreMetricsRecorder;

/// Plain counters owned by a single-threaded cache core.
#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
}

impl CoreMetricsRecorder for LruMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_calls += 1;
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_calls += 1;
        self.insert_updates += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }
}
