//! IP/UDP/TCP framing for frames read from the virtual interface.

pub mod checksum;
mod frame;
mod reply;

pub use frame::{
    classify, Classified, DnsFrame, FrameError, TcpInfo, DNS_PORT, PROTO_TCP, PROTO_UDP, TCP_ACK,
    TCP_FIN, TCP_PSH, TCP_RST, TCP_SYN,
};
pub use reply::{build_tcp_rst, build_udp_reply};
