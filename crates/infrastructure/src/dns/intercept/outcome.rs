use crate::dns::codec::ParsedQuery;
use crate::dns::packet::{DnsFrame, TcpInfo};
use std::net::IpAddr;
use std::time::Instant;

/// Terminal state reached by one frame (or one forwarded completion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not DNS; handed to the pass-through boundary untouched.
    PassedThrough,
    /// Failed IP/transport/DNS parsing. Nothing emitted.
    Malformed,
    CacheHit,
    Blocked,
    /// Blocked TCP query answered with RST+ACK.
    TcpReset,
    /// Allowed TCP query; the client falls back to UDP.
    TcpDropped,
    /// TCP DNS over IPv6.
    Unhandled,
    /// Allowed query handed to the upstream client.
    Forwarded,
    /// Allowed query dropped because `max_in_flight` forwards were pending.
    Throttled,
    /// Upstream answer relayed to the client.
    Answered,
    /// Upstream answer replaced by a block response after a CNAME hit.
    CloakBlocked,
    /// Every upstream failed or answered garbage. Nothing emitted.
    UpstreamFailed,
    /// A reply was built but the interface refused it.
    WriteFailed,
}

impl FrameOutcome {
    /// Whether a frame was written back to the interface.
    pub fn emitted(&self) -> bool {
        matches!(
            self,
            FrameOutcome::CacheHit
                | FrameOutcome::Blocked
                | FrameOutcome::TcpReset
                | FrameOutcome::Answered
                | FrameOutcome::CloakBlocked
        )
    }
}

/// Owned copy of the addressing needed to answer a UDP query later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyRoute {
    pub client: IpAddr,
    pub server: IpAddr,
    pub client_port: u16,
    pub server_port: u16,
}

impl ReplyRoute {
    pub fn of(frame: &DnsFrame<'_>) -> Self {
        Self {
            client: frame.src,
            server: frame.dst,
            client_port: frame.src_port,
            server_port: frame.dst_port,
        }
    }

    /// The original query frame minus its payload, as the reply builder wants it.
    pub fn as_query_frame(&self) -> DnsFrame<'static> {
        DnsFrame {
            src: self.client,
            dst: self.server,
            src_port: self.client_port,
            dst_port: self.server_port,
            transport: TcpInfo::Udp,
            payload: &[],
        }
    }
}

/// An allowed UDP query waiting on the upstream client.
#[derive(Debug, Clone)]
pub struct PendingForward {
    pub route: ReplyRoute,
    pub query: ParsedQuery,
    pub raw: Vec<u8>,
    pub received_at: Instant,
}

pub(super) enum Step {
    Done(FrameOutcome),
    Forward(PendingForward),
}
