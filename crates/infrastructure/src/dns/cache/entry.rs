use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    message: Box<[u8]>,
    inserted_at: Instant,
    ttl: Duration,
    polarity: Polarity,
}

impl CacheEntry {
    pub fn new(message: &[u8], inserted_at: Instant, ttl_secs: u32, polarity: Polarity) -> Self {
        Self {
            message: message.into(),
            inserted_at,
            ttl: Duration::from_secs(ttl_secs as u64),
            polarity,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }

    pub fn ttl_secs(&self) -> u32 {
        self.ttl.as_secs() as u32
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Stored message with `id` written over the cached transaction id.
    pub fn message_with_id(&self, id: u16) -> Vec<u8> {
        let mut out = self.message.to_vec();
        crate::dns::codec::patch_id(&mut out, id);
        out
    }
}
