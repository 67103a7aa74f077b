#![allow(dead_code)]
use dnstrap_domain::{BlockReason, QueryLog, QueryProtocol, RecordType, ResponseStatus};
use std::net::IpAddr;
use std::sync::Arc;

pub struct QueryLogBuilder {
    hostname: Arc<str>,
    record_type: RecordType,
    protocol: QueryProtocol,
    block_reason: Option<BlockReason>,
    status: ResponseStatus,
    cache_hit: bool,
    resolved_ips: Vec<IpAddr>,
    cname_chain: Vec<String>,
}

impl QueryLogBuilder {
    pub fn new() -> Self {
        Self {
            hostname: "example.com".into(),
            record_type: RecordType::A,
            protocol: QueryProtocol::Udp,
            block_reason: None,
            status: ResponseStatus::NoError,
            cache_hit: false,
            resolved_ips: vec![],
            cname_chain: vec![],
        }
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    pub fn tcp(mut self) -> Self {
        self.protocol = QueryProtocol::Tcp;
        self
    }

    pub fn blocked_by(mut self, reason: BlockReason) -> Self {
        self.block_reason = Some(reason);
        self
    }

    pub fn status(mut self, status: ResponseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn cache_hit(mut self) -> Self {
        self.cache_hit = true;
        self
    }

    pub fn resolved(mut self, ip: &str) -> Self {
        self.resolved_ips.push(ip.parse().unwrap());
        self
    }

    pub fn cname(mut self, target: &str) -> Self {
        self.cname_chain.push(target.to_string());
        self
    }

    pub fn build(self) -> QueryLog {
        let mut log = QueryLog::new(self.hostname, self.record_type, self.protocol);
        log.blocked = self.block_reason.is_some();
        log.block_reason = self.block_reason;
        log.status = self.status;
        log.cache_hit = self.cache_hit;
        log.resolved_ips = self.resolved_ips;
        log.cname_chain = self.cname_chain;
        log
    }
}

impl Default for QueryLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
