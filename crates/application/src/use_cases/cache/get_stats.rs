use crate::ports::{CacheMetricsSnapshot, DnsCachePort};
use std::sync::Arc;

pub struct GetCacheStatsUseCase {
    cache: Arc<dyn DnsCachePort>,
}

impl GetCacheStatsUseCase {
    pub fn new(cache: Arc<dyn DnsCachePort>) -> Self {
        Self { cache }
    }

    pub fn execute(&self) -> CacheMetricsSnapshot {
        self.cache.metrics_snapshot()
    }
}
