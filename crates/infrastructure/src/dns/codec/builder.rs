use super::query::{parse_query, ParsedQuery};
use super::{CodecError, FLAG_QR, FLAG_RA, FLAG_RD, HEADER_LEN, RCODE_NXDOMAIN, RCODE_REFUSED};
use dnstrap_domain::{BlockPolicy, RecordType};

/// TTL on synthesized block answers and on the synthetic SOA.
pub const BLOCK_ANSWER_TTL: u32 = 60;

const TYPE_A: u16 = 1;
const TYPE_SOA: u16 = 6;
const TYPE_AAAA: u16 = 28;
/// Compression pointer to the question name at offset 12.
const QNAME_POINTER: [u8; 2] = [0xC0, 0x0C];
const SOA_RNAME_LABEL: &[u8] = b"\x0ahostmaster";
const SOA_SERIAL: u32 = 1;
const SOA_REFRESH: u32 = 3600;
const SOA_RETRY: u32 = 600;
const SOA_EXPIRE: u32 = 86400;

/// Header + first question of `query`, answer counts filled in by the caller.
fn start_response(
    query: &ParsedQuery,
    raw: &[u8],
    rcode: u8,
    ancount: u16,
    nscount: u16,
) -> Result<Vec<u8>, CodecError> {
    let question = raw
        .get(HEADER_LEN..query.question_end)
        .ok_or(CodecError::Truncated(raw.len()))?;

    let flags = FLAG_QR
        | ((query.opcode() as u16) << 11)
        | (query.flags & FLAG_RD)
        | FLAG_RA
        | rcode as u16;

    let mut out = Vec::with_capacity(HEADER_LEN + question.len() + 64);
    out.extend_from_slice(&query.id.to_be_bytes());
    out.extend_from_slice(&flags.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&ancount.to_be_bytes());
    out.extend_from_slice(&nscount.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(question);
    Ok(out)
}

fn push_record_header(out: &mut Vec<u8>, rtype: u16, class: u16, ttl: u32, rdlen: u16) {
    out.extend_from_slice(&QNAME_POINTER);
    out.extend_from_slice(&rtype.to_be_bytes());
    out.extend_from_slice(&class.to_be_bytes());
    out.extend_from_slice(&ttl.to_be_bytes());
    out.extend_from_slice(&rdlen.to_be_bytes());
}

fn push_soa(out: &mut Vec<u8>, class: u16) {
    let mut rdata = Vec::with_capacity(2 + SOA_RNAME_LABEL.len() + 2 + 20);
    rdata.extend_from_slice(&QNAME_POINTER);
    rdata.extend_from_slice(SOA_RNAME_LABEL);
    rdata.extend_from_slice(&QNAME_POINTER);
    for value in [SOA_SERIAL, SOA_REFRESH, SOA_RETRY, SOA_EXPIRE, BLOCK_ANSWER_TTL] {
        rdata.extend_from_slice(&value.to_be_bytes());
    }
    push_record_header(out, TYPE_SOA, class, BLOCK_ANSWER_TTL, rdata.len() as u16);
    out.extend_from_slice(&rdata);
}

pub(crate) fn nxdomain_for(
    query: &ParsedQuery,
    raw: &[u8],
    include_soa: bool,
) -> Result<Vec<u8>, CodecError> {
    let mut out = start_response(query, raw, RCODE_NXDOMAIN, 0, include_soa as u16)?;
    if include_soa {
        push_soa(&mut out, query.qclass);
    }
    Ok(out)
}

/// Types other than A and AAAA get the NXDOMAIN answer, with `include_soa`
/// deciding its authority section.
pub(crate) fn zero_ip_for(
    query: &ParsedQuery,
    raw: &[u8],
    include_soa: bool,
) -> Result<Vec<u8>, CodecError> {
    let (rtype, rdata): (u16, &[u8]) = match query.record_type {
        RecordType::A => (TYPE_A, &[0u8; 4]),
        RecordType::AAAA => (TYPE_AAAA, &[0u8; 16]),
        _ => return nxdomain_for(query, raw, include_soa),
    };
    let mut out = start_response(query, raw, 0, 1, 0)?;
    push_record_header(&mut out, rtype, query.qclass, BLOCK_ANSWER_TTL, rdata.len() as u16);
    out.extend_from_slice(rdata);
    Ok(out)
}

pub(crate) fn refused_for(query: &ParsedQuery, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
    start_response(query, raw, RCODE_REFUSED, 0, 0)
}

/// NXDOMAIN answer to `query`, optionally carrying a synthetic SOA so
/// downstream resolvers can negative-cache it.
pub fn build_nxdomain(query: &[u8], include_soa: bool) -> Result<Vec<u8>, CodecError> {
    let parsed = parse_query(query)?;
    nxdomain_for(&parsed, query, include_soa)
}

/// `0.0.0.0` for A, `::` for AAAA, NXDOMAIN for anything else.
pub fn build_zero_ip(query: &[u8]) -> Result<Vec<u8>, CodecError> {
    let parsed = parse_query(query)?;
    zero_ip_for(&parsed, query, true)
}

pub fn build_refused(query: &[u8]) -> Result<Vec<u8>, CodecError> {
    let parsed = parse_query(query)?;
    refused_for(&parsed, query)
}

/// Block answer for a policy given by name; unknown names mean NXDOMAIN.
pub fn dispatch(policy_name: &str, query: &[u8]) -> Result<Vec<u8>, CodecError> {
    let parsed = parse_query(query)?;
    synthesize_block(BlockPolicy::from_name(policy_name), &parsed, query, true)
}

/// Block answer for an already parsed query.
pub fn synthesize_block(
    policy: BlockPolicy,
    query: &ParsedQuery,
    raw: &[u8],
    include_soa: bool,
) -> Result<Vec<u8>, CodecError> {
    match policy {
        BlockPolicy::Nxdomain => nxdomain_for(query, raw, include_soa),
        BlockPolicy::ZeroIp => zero_ip_for(query, raw, include_soa),
        BlockPolicy::Refused => refused_for(query, raw),
    }
}
