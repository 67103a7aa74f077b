use super::name::read_name;
use super::{CodecError, FLAG_QR, HEADER_LEN};
use dnstrap_domain::RecordType;

/// First question of an intercepted query plus the header bits the
/// builders need to echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub id: u16,
    pub flags: u16,
    pub domain: String,
    pub record_type: RecordType,
    pub qclass: u16,
    /// Offset just past the first question entry.
    pub question_end: usize,
}

impl ParsedQuery {
    pub fn opcode(&self) -> u8 {
        ((self.flags >> 11) & 0x0F) as u8
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags & 0x0100 != 0
    }
}

/// Parses header and first question of a DNS query.
pub fn parse_query(buf: &[u8]) -> Result<ParsedQuery, CodecError> {
    if buf.is_empty() {
        return Err(CodecError::Empty);
    }
    if buf.len() < HEADER_LEN {
        return Err(CodecError::Truncated(buf.len()));
    }

    let id = u16::from_be_bytes([buf[0], buf[1]]);
    let flags = u16::from_be_bytes([buf[2], buf[3]]);
    if flags & FLAG_QR != 0 {
        return Err(CodecError::NotAQuery);
    }

    let qdcount = u16::from_be_bytes([buf[4], buf[5]]);
    if qdcount == 0 {
        return Err(CodecError::NoQuestion);
    }

    let (domain, pos) = read_name(buf, HEADER_LEN)?;
    let fixed = buf
        .get(pos..pos + 4)
        .ok_or(CodecError::Truncated(buf.len()))?;
    let qtype = u16::from_be_bytes([fixed[0], fixed[1]]);
    let qclass = u16::from_be_bytes([fixed[2], fixed[3]]);

    Ok(ParsedQuery {
        id,
        flags,
        domain,
        record_type: RecordType::from_u16(qtype),
        qclass,
        question_end: pos + 4,
    })
}

/// Queried name of a raw DNS query, lowercased, no trailing dot.
pub fn parse_domain(buf: &[u8]) -> Result<String, CodecError> {
    parse_query(buf).map(|q| q.domain)
}

/// Queried record type of a raw DNS query.
pub fn parse_query_type(buf: &[u8]) -> Result<RecordType, CodecError> {
    parse_query(buf).map(|q| q.record_type)
}
