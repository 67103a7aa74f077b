use super::entry::{CacheEntry, Polarity};
use super::key::CacheKey;
use super::metrics::CacheMetrics;
use crate::dns::codec::{
    parse_response, ParsedResponse, RCODE_NOERROR, RCODE_NXDOMAIN, RCODE_REFUSED, RCODE_SERVFAIL,
};
use dnstrap_application::ports::{CacheMetricsSnapshot, DnsCachePort};
use dnstrap_domain::config::cache::{
    MAX_CACHE_TTL_SECS, MIN_CACHE_TTL_SECS, NEGATIVE_CACHE_TTL_SECS,
};
use dnstrap_domain::config::CacheConfig;
use dnstrap_domain::RecordType;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::debug;

type Store = LruCache<CacheKey, CacheEntry, FxBuildHasher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Truncated,
    ServFail,
    Oversized,
    UncacheableRcode(u8),
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Positive { ttl_secs: u32 },
    Negative { ttl_secs: u32 },
    Rejected(RejectReason),
}

/// Positive/negative LRU response cache.
///
/// Each store sits behind its own mutex held only for the map operation, so
/// concurrent completions never wait on each other for long. Same-key inserts
/// are last-writer-wins.
pub struct ResponseCache {
    positive: Mutex<Store>,
    negative: Mutex<Store>,
    max_cacheable_bytes: usize,
    metrics: CacheMetrics,
}

fn new_store(capacity: usize) -> Store {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
    LruCache::with_hasher(capacity, FxBuildHasher)
}

fn lock(store: &Mutex<Store>) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

/// Effective TTL of a positive answer.
pub fn clamp_ttl(min_rr_ttl: u32) -> u32 {
    min_rr_ttl.clamp(MIN_CACHE_TTL_SECS, MAX_CACHE_TTL_SECS)
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            positive: Mutex::new(new_store(config.positive_capacity)),
            negative: Mutex::new(new_store(config.negative_capacity)),
            max_cacheable_bytes: config.max_cacheable_bytes,
            metrics: CacheMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn lookup(&self, domain: &str, record_type: RecordType, id: u16) -> Option<Vec<u8>> {
        self.lookup_at(domain, record_type, id, Instant::now())
    }

    /// Cached message for `(domain, record_type)` with `id` patched in.
    pub fn lookup_at(
        &self,
        domain: &str,
        record_type: RecordType,
        id: u16,
        now: Instant,
    ) -> Option<Vec<u8>> {
        let key = CacheKey::new(domain, record_type);

        for store in [&self.positive, &self.negative] {
            let mut guard = lock(store);
            let Some(entry) = guard.get(&key) else {
                continue;
            };
            if entry.is_expired(now) {
                guard.pop(&key);
                CacheMetrics::record(&self.metrics.expirations);
                continue;
            }
            let message = entry.message_with_id(id);
            drop(guard);
            CacheMetrics::record(&self.metrics.hits);
            return Some(message);
        }

        CacheMetrics::record(&self.metrics.misses);
        None
    }

    pub fn insert(&self, domain: &str, record_type: RecordType, response: &[u8]) -> InsertOutcome {
        match parse_response(response) {
            Ok(parsed) => self.insert_parsed(domain, record_type, response, &parsed, Instant::now()),
            Err(_) => self.reject(RejectReason::Malformed),
        }
    }

    /// Stores an upstream answer whose parse the caller already holds.
    pub fn insert_parsed(
        &self,
        domain: &str,
        record_type: RecordType,
        response: &[u8],
        parsed: &ParsedResponse,
        now: Instant,
    ) -> InsertOutcome {
        if response.len() > self.max_cacheable_bytes {
            return self.reject(RejectReason::Oversized);
        }
        if parsed.truncated {
            return self.reject(RejectReason::Truncated);
        }

        let (polarity, ttl_secs) = match parsed.rcode {
            RCODE_NOERROR => (
                Polarity::Positive,
                clamp_ttl(parsed.min_ttl.unwrap_or(MIN_CACHE_TTL_SECS)),
            ),
            RCODE_NXDOMAIN | RCODE_REFUSED => (Polarity::Negative, NEGATIVE_CACHE_TTL_SECS),
            RCODE_SERVFAIL => return self.reject(RejectReason::ServFail),
            other => return self.reject(RejectReason::UncacheableRcode(other)),
        };

        let key = CacheKey::new(domain, record_type);
        let entry = CacheEntry::new(response, now, ttl_secs, polarity);
        let (target, other) = match polarity {
            Polarity::Positive => (&self.positive, &self.negative),
            Polarity::Negative => (&self.negative, &self.positive),
        };

        lock(other).pop(&key);
        let displaced = lock(target).push(key.clone(), entry);
        if let Some((old_key, _)) = displaced {
            if old_key != key {
                CacheMetrics::record(&self.metrics.evictions);
            }
        }
        CacheMetrics::record(&self.metrics.insertions);

        debug!(domain = %key.domain, qtype = %record_type, ttl = ttl_secs, ?polarity, "Cached response");
        match polarity {
            Polarity::Positive => InsertOutcome::Positive { ttl_secs },
            Polarity::Negative => InsertOutcome::Negative { ttl_secs },
        }
    }

    /// Polarity and effective TTL of a stored entry. Leaves LRU order alone.
    pub fn peek(&self, domain: &str, record_type: RecordType) -> Option<(Polarity, u32)> {
        let key = CacheKey::new(domain, record_type);
        [&self.positive, &self.negative].into_iter().find_map(|store| {
            lock(store)
                .peek(&key)
                .map(|entry| (entry.polarity(), entry.ttl_secs()))
        })
    }

    pub fn positive_len(&self) -> usize {
        lock(&self.positive).len()
    }

    pub fn negative_len(&self) -> usize {
        lock(&self.negative).len()
    }

    fn reject(&self, reason: RejectReason) -> InsertOutcome {
        CacheMetrics::record(&self.metrics.rejections);
        debug!(?reason, "Response not cached");
        InsertOutcome::Rejected(reason)
    }
}

impl DnsCachePort for ResponseCache {
    fn cache_size(&self) -> usize {
        self.positive_len() + self.negative_len()
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            positive_entries: self.positive_len(),
            negative_entries: self.negative_len(),
            hits: CacheMetrics::get(&self.metrics.hits),
            misses: CacheMetrics::get(&self.metrics.misses),
            insertions: CacheMetrics::get(&self.metrics.insertions),
            evictions: CacheMetrics::get(&self.metrics.evictions),
            expirations: CacheMetrics::get(&self.metrics.expirations),
            rejections: CacheMetrics::get(&self.metrics.rejections),
            hit_rate: self.metrics.hit_rate(),
        }
    }

    fn clear(&self) {
        lock(&self.positive).clear();
        lock(&self.negative).clear();
    }
}
