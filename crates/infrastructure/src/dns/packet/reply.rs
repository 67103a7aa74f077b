use super::checksum;
use super::frame::{DnsFrame, FrameError, TcpInfo, PROTO_TCP, PROTO_UDP, TCP_ACK, TCP_RST};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const DEFAULT_TTL: u8 = 64;
const IPV4_HEADER: usize = 20;
const IPV6_HEADER: usize = 40;
const UDP_HEADER: usize = 8;
const TCP_HEADER: usize = 20;

fn ipv4_header(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: u8,
    payload_len: usize,
) -> Result<[u8; IPV4_HEADER], FrameError> {
    let total = u16::try_from(IPV4_HEADER + payload_len).map_err(|_| FrameError::Oversized)?;
    let mut h = [0u8; IPV4_HEADER];
    h[0] = 0x45;
    h[2..4].copy_from_slice(&total.to_be_bytes());
    // Don't Fragment; identification unused.
    h[6] = 0x40;
    h[8] = DEFAULT_TTL;
    h[9] = protocol;
    h[12..16].copy_from_slice(&src.octets());
    h[16..20].copy_from_slice(&dst.octets());
    let sum = checksum::ipv4_header(&h);
    h[10..12].copy_from_slice(&sum.to_be_bytes());
    Ok(h)
}

fn ipv6_header(
    src: Ipv6Addr,
    dst: Ipv6Addr,
    next_header: u8,
    payload_len: usize,
) -> Result<[u8; IPV6_HEADER], FrameError> {
    let len = u16::try_from(payload_len).map_err(|_| FrameError::Oversized)?;
    let mut h = [0u8; IPV6_HEADER];
    h[0] = 0x60;
    h[4..6].copy_from_slice(&len.to_be_bytes());
    h[6] = next_header;
    h[7] = DEFAULT_TTL;
    h[8..24].copy_from_slice(&src.octets());
    h[24..40].copy_from_slice(&dst.octets());
    Ok(h)
}

/// UDP datagram carrying `dns` back to the sender of `query`, with
/// addresses and ports swapped.
pub fn build_udp_reply(query: &DnsFrame<'_>, dns: &[u8]) -> Result<Vec<u8>, FrameError> {
    let udp_len = u16::try_from(UDP_HEADER + dns.len()).map_err(|_| FrameError::Oversized)?;
    let mut segment = Vec::with_capacity(udp_len as usize);
    segment.extend_from_slice(&query.dst_port.to_be_bytes());
    segment.extend_from_slice(&query.src_port.to_be_bytes());
    segment.extend_from_slice(&udp_len.to_be_bytes());
    segment.extend_from_slice(&[0, 0]);
    segment.extend_from_slice(dns);

    match (query.dst, query.src) {
        (IpAddr::V4(src), IpAddr::V4(dst)) => {
            let sum =
                checksum::udp_on_wire(checksum::ipv4_transport(src, dst, PROTO_UDP, &segment));
            segment[6..8].copy_from_slice(&sum.to_be_bytes());
            let header = ipv4_header(src, dst, PROTO_UDP, segment.len())?;
            Ok([header.as_slice(), segment.as_slice()].concat())
        }
        (IpAddr::V6(src), IpAddr::V6(dst)) => {
            let sum =
                checksum::udp_on_wire(checksum::ipv6_transport(src, dst, PROTO_UDP, &segment));
            segment[6..8].copy_from_slice(&sum.to_be_bytes());
            let header = ipv6_header(src, dst, PROTO_UDP, segment.len())?;
            Ok([header.as_slice(), segment.as_slice()].concat())
        }
        _ => Err(FrameError::BadLength { layer: "IP" }),
    }
}

/// RST+ACK answering a TCP query segment: sequence 0, acknowledgment
/// `seq + segment_len`, ports swapped. IPv4 only.
pub fn build_tcp_rst(query: &DnsFrame<'_>) -> Result<Vec<u8>, FrameError> {
    let TcpInfo::Tcp {
        seq, segment_len, ..
    } = query.transport
    else {
        return Err(FrameError::BadLength { layer: "TCP" });
    };
    let (IpAddr::V4(client), IpAddr::V4(server)) = (query.src, query.dst) else {
        return Err(FrameError::Ipv6TcpUnsupported);
    };

    let mut segment = [0u8; TCP_HEADER];
    segment[0..2].copy_from_slice(&query.dst_port.to_be_bytes());
    segment[2..4].copy_from_slice(&query.src_port.to_be_bytes());
    // seq stays 0
    segment[8..12].copy_from_slice(&seq.wrapping_add(segment_len).to_be_bytes());
    segment[12] = ((TCP_HEADER / 4) as u8) << 4;
    segment[13] = TCP_RST | TCP_ACK;
    let sum = checksum::ipv4_transport(server, client, PROTO_TCP, &segment);
    segment[16..18].copy_from_slice(&sum.to_be_bytes());

    let header = ipv4_header(server, client, PROTO_TCP, segment.len())?;
    Ok([header.as_slice(), segment.as_slice()].concat())
}
