use crate::dns_record::RecordType;
use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Blocklist,
    CnameCloak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryProtocol {
    Udp,
    Tcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    NoError,
    NxDomain,
    Refused,
    ServFail,
    TcpReset,
    Other(u8),
}

impl ResponseStatus {
    pub fn from_rcode(rcode: u8) -> Self {
        match rcode {
            0 => ResponseStatus::NoError,
            2 => ResponseStatus::ServFail,
            3 => ResponseStatus::NxDomain,
            5 => ResponseStatus::Refused,
            other => ResponseStatus::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::NoError => "NOERROR",
            ResponseStatus::NxDomain => "NXDOMAIN",
            ResponseStatus::Refused => "REFUSED",
            ResponseStatus::ServFail => "SERVFAIL",
            ResponseStatus::TcpReset => "TCP_RESET",
            ResponseStatus::Other(_) => "OTHER",
        }
    }
}

/// One observability record per answered query.
#[derive(Debug, Clone)]
pub struct QueryLog {
    pub hostname: Arc<str>,
    pub record_type: RecordType,
    pub blocked: bool,
    pub block_reason: Option<BlockReason>,
    pub timestamp: DateTime<Utc>,
    pub latency_us: u64,
    pub upstream: Option<Arc<str>>,
    pub cname_chain: Vec<String>,
    pub resolved_ips: Vec<IpAddr>,
    pub cache_hit: bool,
    pub status: ResponseStatus,
    pub protocol: QueryProtocol,
}

impl QueryLog {
    pub fn new(hostname: Arc<str>, record_type: RecordType, protocol: QueryProtocol) -> Self {
        Self {
            hostname,
            record_type,
            blocked: false,
            block_reason: None,
            timestamp: Utc::now(),
            latency_us: 0,
            upstream: None,
            cname_chain: vec![],
            resolved_ips: vec![],
            cache_hit: false,
            status: ResponseStatus::NoError,
            protocol,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryStats {
    pub queries_total: u64,
    pub queries_blocked: u64,
    pub cname_cloaks: u64,
    pub upstream_failures: u64,
    pub malformed_frames: u64,
    /// Allowed queries dropped at the in-flight forward limit.
    pub queries_throttled: u64,
}
