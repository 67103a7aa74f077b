//! RFC 1071 one's-complement checksums.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Adds `data` as big-endian 16-bit words into a running 32-bit sum.
pub fn accumulate(mut sum: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for pair in &mut chunks {
        sum = sum.wrapping_add(u16::from_be_bytes([pair[0], pair[1]]) as u32);
    }
    if let [last] = chunks.remainder() {
        sum = sum.wrapping_add((*last as u32) << 8);
    }
    sum
}

pub fn finish(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

pub fn ipv4_header(header: &[u8]) -> u16 {
    finish(accumulate(0, header))
}

/// UDP/TCP checksum over the IPv4 pseudo-header and `segment`.
pub fn ipv4_transport(src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, segment: &[u8]) -> u16 {
    let mut sum = accumulate(0, &src.octets());
    sum = accumulate(sum, &dst.octets());
    sum = sum.wrapping_add(protocol as u32);
    sum = sum.wrapping_add(segment.len() as u32);
    finish(accumulate(sum, segment))
}

/// UDP/TCP checksum over the IPv6 pseudo-header and `segment`.
pub fn ipv6_transport(src: Ipv6Addr, dst: Ipv6Addr, next_header: u8, segment: &[u8]) -> u16 {
    let mut sum = accumulate(0, &src.octets());
    sum = accumulate(sum, &dst.octets());
    let len = segment.len() as u32;
    sum = sum.wrapping_add(len >> 16).wrapping_add(len & 0xFFFF);
    sum = sum.wrapping_add(next_header as u32);
    finish(accumulate(sum, segment))
}

/// UDP transmits a computed zero as all ones.
pub fn udp_on_wire(checksum: u16) -> u16 {
    if checksum == 0 {
        0xFFFF
    } else {
        checksum
    }
}
