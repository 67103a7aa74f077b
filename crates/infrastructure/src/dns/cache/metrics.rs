use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

// align(64) keeps the hot hit/miss pair on its own cache line.
#[derive(Default)]
#[repr(align(64))]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    _hot_pad: [u64; 6],

    pub insertions: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
    pub rejections: AtomicU64,
}

impl CacheMetrics {
    #[inline]
    pub fn record(counter: &AtomicU64) {
        counter.fetch_add(1, AtomicOrdering::Relaxed);
    }

    #[inline]
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(AtomicOrdering::Relaxed)
    }

    /// Hit ratio in `[0, 1]`; zero before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = Self::get(&self.hits) as f64;
        let total = hits + Self::get(&self.misses) as f64;

        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}
