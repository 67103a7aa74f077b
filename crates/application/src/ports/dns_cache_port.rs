/// Snapshot of response cache counters for observability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheMetricsSnapshot {
    pub positive_entries: usize,
    pub negative_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub rejections: u64,
    pub hit_rate: f64,
}

impl CacheMetricsSnapshot {
    pub fn total_entries(&self) -> usize {
        self.positive_entries + self.negative_entries
    }
}

/// Read side of the response cache exposed outside the hot path.
pub trait DnsCachePort: Send + Sync {
    fn cache_size(&self) -> usize;
    fn metrics_snapshot(&self) -> CacheMetricsSnapshot;
    fn clear(&self);
}
