use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub const CLIENT_V4: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
pub const TRAP_V4: Ipv4Addr = Ipv4Addr::new(10, 111, 222, 1);
pub const CLIENT_V6: Ipv6Addr = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 2);
pub const TRAP_V6: Ipv6Addr = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 0x53);

const PROTO_TCP: u8 = 6;
const PROTO_UDP: u8 = 17;

/// 16-bit one's-complement sum, folded but not inverted.
pub fn ones_complement(chunks: &[&[u8]]) -> u16 {
    let mut sum: u32 = 0;
    for chunk in chunks {
        let mut iter = chunk.chunks_exact(2);
        for pair in &mut iter {
            sum += u16::from_be_bytes([pair[0], pair[1]]) as u32;
        }
        if let [last] = iter.remainder() {
            sum += (*last as u32) << 8;
        }
    }
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

fn pseudo_v4(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, len: usize) -> Vec<u8> {
    let mut p = Vec::with_capacity(12);
    p.extend_from_slice(&src.octets());
    p.extend_from_slice(&dst.octets());
    p.push(0);
    p.push(protocol);
    p.extend_from_slice(&(len as u16).to_be_bytes());
    p
}

fn pseudo_v6(src: Ipv6Addr, dst: Ipv6Addr, next: u8, len: usize) -> Vec<u8> {
    let mut p = Vec::with_capacity(40);
    p.extend_from_slice(&src.octets());
    p.extend_from_slice(&dst.octets());
    p.extend_from_slice(&(len as u32).to_be_bytes());
    p.extend_from_slice(&[0, 0, 0, next]);
    p
}

fn ipv4_frame(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, segment: &[u8]) -> Vec<u8> {
    let mut h = [0u8; 20];
    h[0] = 0x45;
    h[2..4].copy_from_slice(&((20 + segment.len()) as u16).to_be_bytes());
    h[8] = 64;
    h[9] = protocol;
    h[12..16].copy_from_slice(&src.octets());
    h[16..20].copy_from_slice(&dst.octets());
    let sum = !ones_complement(&[&h]);
    h[10..12].copy_from_slice(&sum.to_be_bytes());
    [h.as_slice(), segment].concat()
}

fn ipv6_frame(src: Ipv6Addr, dst: Ipv6Addr, next: u8, segment: &[u8]) -> Vec<u8> {
    let mut h = [0u8; 40];
    h[0] = 0x60;
    h[4..6].copy_from_slice(&(segment.len() as u16).to_be_bytes());
    h[6] = next;
    h[7] = 64;
    h[8..24].copy_from_slice(&src.octets());
    h[24..40].copy_from_slice(&dst.octets());
    [h.as_slice(), segment].concat()
}

fn udp_segment(sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
    let mut s = Vec::with_capacity(8 + payload.len());
    s.extend_from_slice(&sport.to_be_bytes());
    s.extend_from_slice(&dport.to_be_bytes());
    s.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    s.extend_from_slice(&[0, 0]);
    s.extend_from_slice(payload);
    s
}

fn tcp_segment(sport: u16, dport: u16, seq: u32, flags: u8, payload: &[u8]) -> Vec<u8> {
    let mut s = vec![0u8; 20];
    s[0..2].copy_from_slice(&sport.to_be_bytes());
    s[2..4].copy_from_slice(&dport.to_be_bytes());
    s[4..8].copy_from_slice(&seq.to_be_bytes());
    s[12] = 5 << 4;
    s[13] = flags;
    s[14..16].copy_from_slice(&65535u16.to_be_bytes());
    s.extend_from_slice(payload);
    s
}

pub fn udp_v4(src: Ipv4Addr, dst: Ipv4Addr, sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
    let mut seg = udp_segment(sport, dport, payload);
    let sum = !ones_complement(&[&pseudo_v4(src, dst, PROTO_UDP, seg.len()), &seg]);
    seg[6..8].copy_from_slice(&(if sum == 0 { 0xFFFF } else { sum }).to_be_bytes());
    ipv4_frame(src, dst, PROTO_UDP, &seg)
}

pub fn udp_v6(src: Ipv6Addr, dst: Ipv6Addr, sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
    let mut seg = udp_segment(sport, dport, payload);
    let sum = !ones_complement(&[&pseudo_v6(src, dst, PROTO_UDP, seg.len()), &seg]);
    seg[6..8].copy_from_slice(&(if sum == 0 { 0xFFFF } else { sum }).to_be_bytes());
    ipv6_frame(src, dst, PROTO_UDP, &seg)
}

/// TCP segment whose payload is `message` behind the RFC 7766 length prefix.
pub fn tcp_v4(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    sport: u16,
    dport: u16,
    seq: u32,
    flags: u8,
    message: &[u8],
) -> Vec<u8> {
    let payload = length_prefixed(message);
    let mut seg = tcp_segment(sport, dport, seq, flags, &payload);
    let sum = !ones_complement(&[&pseudo_v4(src, dst, PROTO_TCP, seg.len()), &seg]);
    seg[16..18].copy_from_slice(&sum.to_be_bytes());
    ipv4_frame(src, dst, PROTO_TCP, &seg)
}

pub fn tcp_v6(
    src: Ipv6Addr,
    dst: Ipv6Addr,
    sport: u16,
    dport: u16,
    seq: u32,
    flags: u8,
    message: &[u8],
) -> Vec<u8> {
    let payload = length_prefixed(message);
    let mut seg = tcp_segment(sport, dport, seq, flags, &payload);
    let sum = !ones_complement(&[&pseudo_v6(src, dst, PROTO_TCP, seg.len()), &seg]);
    seg[16..18].copy_from_slice(&sum.to_be_bytes());
    ipv6_frame(src, dst, PROTO_TCP, &seg)
}

fn length_prefixed(message: &[u8]) -> Vec<u8> {
    if message.is_empty() {
        return vec![];
    }
    let mut p = (message.len() as u16).to_be_bytes().to_vec();
    p.extend_from_slice(message);
    p
}

/// Decoded view of a frame the engine wrote.
#[derive(Debug)]
pub struct IpView {
    pub src: IpAddr,
    pub dst: IpAddr,
    pub protocol: u8,
    pub header: Vec<u8>,
    pub segment: Vec<u8>,
}

impl IpView {
    pub fn parse(frame: &[u8]) -> Self {
        match frame[0] >> 4 {
            4 => {
                let ihl = ((frame[0] & 0x0F) as usize) * 4;
                let total = u16::from_be_bytes([frame[2], frame[3]]) as usize;
                assert_eq!(total, frame.len(), "IPv4 total length");
                Self {
                    src: IpAddr::V4(Ipv4Addr::new(frame[12], frame[13], frame[14], frame[15])),
                    dst: IpAddr::V4(Ipv4Addr::new(frame[16], frame[17], frame[18], frame[19])),
                    protocol: frame[9],
                    header: frame[..ihl].to_vec(),
                    segment: frame[ihl..].to_vec(),
                }
            }
            6 => {
                let len = u16::from_be_bytes([frame[4], frame[5]]) as usize;
                assert_eq!(40 + len, frame.len(), "IPv6 payload length");
                let mut src = [0u8; 16];
                src.copy_from_slice(&frame[8..24]);
                let mut dst = [0u8; 16];
                dst.copy_from_slice(&frame[24..40]);
                Self {
                    src: IpAddr::V6(Ipv6Addr::from(src)),
                    dst: IpAddr::V6(Ipv6Addr::from(dst)),
                    protocol: frame[6],
                    header: frame[..40].to_vec(),
                    segment: frame[40..].to_vec(),
                }
            }
            v => panic!("unexpected IP version {}", v),
        }
    }

    pub fn src_port(&self) -> u16 {
        u16::from_be_bytes([self.segment[0], self.segment[1]])
    }

    pub fn dst_port(&self) -> u16 {
        u16::from_be_bytes([self.segment[2], self.segment[3]])
    }

    /// UDP payload, i.e. the DNS message.
    pub fn udp_payload(&self) -> &[u8] {
        &self.segment[8..]
    }

    pub fn ipv4_header_valid(&self) -> bool {
        ones_complement(&[&self.header]) == 0xFFFF
    }

    /// Sum over pseudo-header and segment including the checksum field.
    pub fn transport_checksum_valid(&self) -> bool {
        let pseudo = match (self.src, self.dst) {
            (IpAddr::V4(s), IpAddr::V4(d)) => pseudo_v4(s, d, self.protocol, self.segment.len()),
            (IpAddr::V6(s), IpAddr::V6(d)) => pseudo_v6(s, d, self.protocol, self.segment.len()),
            _ => return false,
        };
        ones_complement(&[&pseudo, &self.segment]) == 0xFFFF
    }

    pub fn tcp_seq(&self) -> u32 {
        u32::from_be_bytes([self.segment[4], self.segment[5], self.segment[6], self.segment[7]])
    }

    pub fn tcp_ack(&self) -> u32 {
        u32::from_be_bytes([self.segment[8], self.segment[9], self.segment[10], self.segment[11]])
    }

    pub fn tcp_flags(&self) -> u8 {
        self.segment[13]
    }
}
