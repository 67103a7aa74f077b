use dnstrap_domain::QueryStats;
use std::sync::atomic::{AtomicU64, Ordering};

/// Engine-wide counters, read by the periodic stats report.
#[derive(Default)]
pub struct EngineStats {
    queries_total: AtomicU64,
    queries_blocked: AtomicU64,
    cname_cloaks: AtomicU64,
    upstream_failures: AtomicU64,
    malformed_frames: AtomicU64,
    queries_throttled: AtomicU64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blocked(&self) {
        self.queries_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cname_cloak(&self) {
        self.cname_cloaks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_throttled(&self) {
        self.queries_throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> QueryStats {
        QueryStats {
            queries_total: self.queries_total.load(Ordering::Relaxed),
            queries_blocked: self.queries_blocked.load(Ordering::Relaxed),
            cname_cloaks: self.cname_cloaks.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            queries_throttled: self.queries_throttled.load(Ordering::Relaxed),
        }
    }
}
