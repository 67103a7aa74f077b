use serde::{Deserialize, Serialize};

/// Lower bound applied to positive answer TTLs.
pub const MIN_CACHE_TTL_SECS: u32 = 10;
/// Upper bound applied to positive answer TTLs.
pub const MAX_CACHE_TTL_SECS: u32 = 3600;
/// Fixed lifetime of NXDOMAIN / REFUSED entries, whatever the SOA says.
pub const NEGATIVE_CACHE_TTL_SECS: u32 = 60;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_positive_capacity")]
    pub positive_capacity: usize,

    #[serde(default = "default_negative_capacity")]
    pub negative_capacity: usize,

    #[serde(default = "default_max_cacheable_bytes")]
    pub max_cacheable_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            positive_capacity: default_positive_capacity(),
            negative_capacity: default_negative_capacity(),
            max_cacheable_bytes: default_max_cacheable_bytes(),
        }
    }
}

fn default_positive_capacity() -> usize {
    2000
}

fn default_negative_capacity() -> usize {
    500
}

fn default_max_cacheable_bytes() -> usize {
    4096
}
