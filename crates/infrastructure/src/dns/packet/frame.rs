use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

pub const DNS_PORT: u16 = 53;
pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;

const IPV4_MIN_HEADER: usize = 20;
const IPV6_HEADER: usize = 40;
const UDP_HEADER: usize = 8;
const TCP_MIN_HEADER: usize = 20;

pub const TCP_FIN: u8 = 0x01;
pub const TCP_SYN: u8 = 0x02;
pub const TCP_RST: u8 = 0x04;
pub const TCP_PSH: u8 = 0x08;
pub const TCP_ACK: u8 = 0x10;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame is empty")]
    Empty,

    #[error("unknown IP version {0}")]
    UnknownVersion(u8),

    #[error("{layer} header truncated")]
    Truncated { layer: &'static str },

    #[error("{layer} length field disagrees with the frame")]
    BadLength { layer: &'static str },

    #[error("reply exceeds the maximum IP datagram size")]
    Oversized,

    #[error("TCP over IPv6 is not handled")]
    Ipv6TcpUnsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpInfo {
    Udp,
    Tcp {
        seq: u32,
        ack: u32,
        flags: u8,
        /// Sequence space the segment occupies: payload plus SYN/FIN.
        segment_len: u32,
    },
}

/// A UDP or TCP segment to or from port 53.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsFrame<'a> {
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub transport: TcpInfo,
    /// Transport payload as received. For TCP this still carries the
    /// two-byte length prefix.
    pub payload: &'a [u8],
}

impl<'a> DnsFrame<'a> {
    pub fn is_tcp(&self) -> bool {
        matches!(self.transport, TcpInfo::Tcp { .. })
    }

    pub fn is_ipv6(&self) -> bool {
        self.dst.is_ipv6()
    }

    /// The DNS message inside the payload. TCP payloads are unwrapped from
    /// their length prefix; a message continuing in a later segment is
    /// returned as far as this segment carries it.
    pub fn dns_message(&self) -> Option<&'a [u8]> {
        match self.transport {
            TcpInfo::Udp => Some(self.payload),
            TcpInfo::Tcp { .. } => {
                let prefix = self.payload.get(..2)?;
                let declared = u16::from_be_bytes([prefix[0], prefix[1]]) as usize;
                let end = (2 + declared).min(self.payload.len());
                Some(&self.payload[2..end])
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    Dns(DnsFrame<'a>),
    /// Valid IP traffic that is not for this engine.
    NotDns,
}

/// Demultiplexes a raw IP frame read from the virtual interface.
pub fn classify(frame: &[u8]) -> Result<Classified<'_>, FrameError> {
    let first = *frame.first().ok_or(FrameError::Empty)?;
    match first >> 4 {
        4 => classify_ipv4(frame),
        6 => classify_ipv6(frame),
        other => Err(FrameError::UnknownVersion(other)),
    }
}

fn classify_ipv4(frame: &[u8]) -> Result<Classified<'_>, FrameError> {
    if frame.len() < IPV4_MIN_HEADER {
        return Err(FrameError::Truncated { layer: "IPv4" });
    }
    let ihl = ((frame[0] & 0x0F) as usize) * 4;
    let total_len = u16::from_be_bytes([frame[2], frame[3]]) as usize;
    if ihl < IPV4_MIN_HEADER || total_len < ihl || total_len > frame.len() {
        return Err(FrameError::BadLength { layer: "IPv4" });
    }

    // Fragments are not reassembled.
    let frag = u16::from_be_bytes([frame[6], frame[7]]);
    if frag & 0x3FFF != 0 {
        return Ok(Classified::NotDns);
    }

    let src = Ipv4Addr::new(frame[12], frame[13], frame[14], frame[15]);
    let dst = Ipv4Addr::new(frame[16], frame[17], frame[18], frame[19]);
    classify_transport(frame[9], IpAddr::V4(src), IpAddr::V4(dst), &frame[ihl..total_len])
}

fn classify_ipv6(frame: &[u8]) -> Result<Classified<'_>, FrameError> {
    if frame.len() < IPV6_HEADER {
        return Err(FrameError::Truncated { layer: "IPv6" });
    }
    let payload_len = u16::from_be_bytes([frame[4], frame[5]]) as usize;
    if IPV6_HEADER + payload_len > frame.len() {
        return Err(FrameError::BadLength { layer: "IPv6" });
    }

    let mut src = [0u8; 16];
    src.copy_from_slice(&frame[8..24]);
    let mut dst = [0u8; 16];
    dst.copy_from_slice(&frame[24..40]);

    // Extension headers are not walked: anything but UDP/TCP directly
    // after the fixed header is not ours.
    classify_transport(
        frame[6],
        IpAddr::V6(Ipv6Addr::from(src)),
        IpAddr::V6(Ipv6Addr::from(dst)),
        &frame[IPV6_HEADER..IPV6_HEADER + payload_len],
    )
}

fn classify_transport(
    protocol: u8,
    src: IpAddr,
    dst: IpAddr,
    segment: &[u8],
) -> Result<Classified<'_>, FrameError> {
    match protocol {
        PROTO_UDP => {
            if segment.len() < UDP_HEADER {
                return Err(FrameError::Truncated { layer: "UDP" });
            }
            let src_port = u16::from_be_bytes([segment[0], segment[1]]);
            let dst_port = u16::from_be_bytes([segment[2], segment[3]]);
            if src_port != DNS_PORT && dst_port != DNS_PORT {
                return Ok(Classified::NotDns);
            }
            let udp_len = u16::from_be_bytes([segment[4], segment[5]]) as usize;
            if udp_len < UDP_HEADER || udp_len > segment.len() {
                return Err(FrameError::BadLength { layer: "UDP" });
            }
            Ok(Classified::Dns(DnsFrame {
                src,
                dst,
                src_port,
                dst_port,
                transport: TcpInfo::Udp,
                payload: &segment[UDP_HEADER..udp_len],
            }))
        }
        PROTO_TCP => {
            if segment.len() < TCP_MIN_HEADER {
                return Err(FrameError::Truncated { layer: "TCP" });
            }
            let src_port = u16::from_be_bytes([segment[0], segment[1]]);
            let dst_port = u16::from_be_bytes([segment[2], segment[3]]);
            if src_port != DNS_PORT && dst_port != DNS_PORT {
                return Ok(Classified::NotDns);
            }
            let data_offset = ((segment[12] >> 4) as usize) * 4;
            if data_offset < TCP_MIN_HEADER || data_offset > segment.len() {
                return Err(FrameError::BadLength { layer: "TCP" });
            }
            let seq = u32::from_be_bytes([segment[4], segment[5], segment[6], segment[7]]);
            let ack = u32::from_be_bytes([segment[8], segment[9], segment[10], segment[11]]);
            let flags = segment[13];
            let payload = &segment[data_offset..];
            let segment_len = payload.len() as u32
                + (flags & TCP_SYN != 0) as u32
                + (flags & TCP_FIN != 0) as u32;
            Ok(Classified::Dns(DnsFrame {
                src,
                dst,
                src_port,
                dst_port,
                transport: TcpInfo::Tcp {
                    seq,
                    ack,
                    flags,
                    segment_len,
                },
                payload,
            }))
        }
        _ => Ok(Classified::NotDns),
    }
}
