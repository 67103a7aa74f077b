use super::name::{read_name, skip_name};
use super::{CodecError, FLAG_QR, FLAG_TC, HEADER_LEN};
use std::net::{Ipv4Addr, Ipv6Addr};

const TYPE_A: u16 = 1;
const TYPE_CNAME: u16 = 5;
const TYPE_AAAA: u16 = 28;
const TYPE_OPT: u16 = 41;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub name: String,
    pub rtype: u16,
    pub ttl: u32,
    pub data: RecordData,
}

/// The parts of an upstream answer the engine acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub id: u16,
    pub rcode: u8,
    pub truncated: bool,
    pub question: Option<String>,
    pub answers: Vec<AnswerRecord>,
    /// Smallest TTL over every record in every section, OPT excluded.
    pub min_ttl: Option<u32>,
}

impl ParsedResponse {
    /// CNAME targets in answer order.
    pub fn cname_targets(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().filter_map(|r| match &r.data {
            RecordData::Cname(target) => Some(target.as_str()),
            _ => None,
        })
    }
}

pub fn parse_response(buf: &[u8]) -> Result<ParsedResponse, CodecError> {
    if buf.is_empty() {
        return Err(CodecError::Empty);
    }
    if buf.len() < HEADER_LEN {
        return Err(CodecError::Truncated(buf.len()));
    }

    let id = u16::from_be_bytes([buf[0], buf[1]]);
    let flags = u16::from_be_bytes([buf[2], buf[3]]);
    if flags & FLAG_QR == 0 {
        return Err(CodecError::NotAResponse);
    }
    let count = |i: usize| u16::from_be_bytes([buf[i], buf[i + 1]]) as usize;
    let (qdcount, ancount, nscount, arcount) = (count(4), count(6), count(8), count(10));

    let mut pos = HEADER_LEN;
    let mut question = None;
    for i in 0..qdcount {
        if i == 0 {
            let (name, end) = read_name(buf, pos)?;
            question = Some(name);
            pos = end;
        } else {
            pos = skip_name(buf, pos)?;
        }
        pos += 4;
        if pos > buf.len() {
            return Err(CodecError::Truncated(buf.len()));
        }
    }

    let mut answers = Vec::with_capacity(ancount.min(32));
    let mut min_ttl: Option<u32> = None;

    for section in 0..3 {
        let records = match section {
            0 => ancount,
            1 => nscount,
            _ => arcount,
        };
        for _ in 0..records {
            let (name, after_name) = if section == 0 {
                read_name(buf, pos)?
            } else {
                (String::new(), skip_name(buf, pos)?)
            };
            let fixed = buf
                .get(after_name..after_name + 10)
                .ok_or(CodecError::Truncated(buf.len()))?;
            let rtype = u16::from_be_bytes([fixed[0], fixed[1]]);
            let ttl = u32::from_be_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]);
            let rdlen = u16::from_be_bytes([fixed[8], fixed[9]]) as usize;
            let rdata_start = after_name + 10;
            let rdata = buf
                .get(rdata_start..rdata_start + rdlen)
                .ok_or(CodecError::Truncated(buf.len()))?;

            if rtype != TYPE_OPT {
                min_ttl = Some(min_ttl.map_or(ttl, |current| current.min(ttl)));
            }

            if section == 0 {
                let data = match (rtype, rdlen) {
                    (TYPE_A, 4) => RecordData::A(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3])),
                    (TYPE_AAAA, 16) => {
                        let mut octets = [0u8; 16];
                        octets.copy_from_slice(rdata);
                        RecordData::Aaaa(Ipv6Addr::from(octets))
                    }
                    (TYPE_CNAME, _) => RecordData::Cname(read_name(buf, rdata_start)?.0),
                    _ => RecordData::Other,
                };
                answers.push(AnswerRecord {
                    name,
                    rtype,
                    ttl,
                    data,
                });
            }

            pos = rdata_start + rdlen;
        }
    }

    Ok(ParsedResponse {
        id,
        rcode: (flags & 0x000F) as u8,
        truncated: flags & FLAG_TC != 0,
        question,
        answers,
        min_ttl,
    })
}

/// Overwrites the transaction id in place. False if `buf` has no header.
pub fn patch_id(buf: &mut [u8], id: u16) -> bool {
    match buf.get_mut(0..2) {
        Some(slot) => {
            slot.copy_from_slice(&id.to_be_bytes());
            true
        }
        None => false,
    }
}
