mod entry;
mod key;
mod metrics;
mod storage;

pub use entry::{CacheEntry, Polarity};
pub use key::CacheKey;
pub use metrics::CacheMetrics;
pub use storage::{clamp_ttl, InsertOutcome, RejectReason, ResponseCache};
