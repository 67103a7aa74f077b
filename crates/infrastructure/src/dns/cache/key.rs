use compact_str::CompactString;
use dnstrap_domain::RecordType;

/// Cache key: lowercased query name and query type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: CompactString,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        Self {
            domain: CompactString::new(domain.trim_end_matches('.').to_ascii_lowercase()),
            record_type,
        }
    }
}
