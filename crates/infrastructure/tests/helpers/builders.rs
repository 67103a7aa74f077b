use std::net::{Ipv4Addr, Ipv6Addr};

pub const TYPE_A: u16 = 1;
pub const TYPE_CNAME: u16 = 5;
pub const TYPE_SOA: u16 = 6;
pub const TYPE_MX: u16 = 15;
pub const TYPE_AAAA: u16 = 28;
pub const TYPE_OPT: u16 = 41;

pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() + 2);
    for label in name.trim_end_matches('.').split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

/// Standard recursive query with one question.
pub fn query(id: u16, name: &str, qtype: u16) -> Vec<u8> {
    query_with_flags(id, 0x0100, name, qtype)
}

pub fn query_with_flags(id: u16, flags: u16, name: &str, qtype: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&id.to_be_bytes());
    out.extend_from_slice(&flags.to_be_bytes());
    out.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0]);
    out.extend_from_slice(&encode_name(name));
    out.extend_from_slice(&qtype.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out
}

struct Rr {
    owner: String,
    rtype: u16,
    ttl: u32,
    rdata: Vec<u8>,
}

impl Rr {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_name(&self.owner));
        out.extend_from_slice(&self.rtype.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&(self.rdata.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.rdata);
    }
}

/// Upstream-style answer written without compression.
pub struct ResponseBuilder {
    id: u16,
    name: String,
    qtype: u16,
    rcode: u8,
    truncated: bool,
    answers: Vec<Rr>,
    authority: Vec<Rr>,
    additional: Vec<Rr>,
}

impl ResponseBuilder {
    pub fn new(id: u16, name: &str, qtype: u16) -> Self {
        Self {
            id,
            name: name.to_string(),
            qtype,
            rcode: 0,
            truncated: false,
            answers: vec![],
            authority: vec![],
            additional: vec![],
        }
    }

    pub fn rcode(mut self, rcode: u8) -> Self {
        self.rcode = rcode;
        self
    }

    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    pub fn a(mut self, owner: &str, ttl: u32, addr: Ipv4Addr) -> Self {
        self.answers.push(Rr {
            owner: owner.to_string(),
            rtype: TYPE_A,
            ttl,
            rdata: addr.octets().to_vec(),
        });
        self
    }

    pub fn aaaa(mut self, owner: &str, ttl: u32, addr: Ipv6Addr) -> Self {
        self.answers.push(Rr {
            owner: owner.to_string(),
            rtype: TYPE_AAAA,
            ttl,
            rdata: addr.octets().to_vec(),
        });
        self
    }

    pub fn cname(mut self, owner: &str, ttl: u32, target: &str) -> Self {
        self.answers.push(Rr {
            owner: owner.to_string(),
            rtype: TYPE_CNAME,
            ttl,
            rdata: encode_name(target),
        });
        self
    }

    pub fn soa(mut self, zone: &str, ttl: u32, minimum: u32) -> Self {
        let mut rdata = encode_name(&format!("ns1.{}", zone));
        rdata.extend_from_slice(&encode_name(&format!("hostmaster.{}", zone)));
        for value in [1u32, 3600, 900, 604800, minimum] {
            rdata.extend_from_slice(&value.to_be_bytes());
        }
        self.authority.push(Rr {
            owner: zone.to_string(),
            rtype: TYPE_SOA,
            ttl,
            rdata,
        });
        self
    }

    /// EDNS OPT pseudo-record; its "TTL" field must not count toward caching.
    pub fn opt(mut self) -> Self {
        self.additional.push(Rr {
            owner: String::new(),
            rtype: TYPE_OPT,
            ttl: 0,
            rdata: vec![],
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut flags: u16 = 0x8180 | self.rcode as u16;
        if self.truncated {
            flags |= 0x0200;
        }
        let mut out = Vec::with_capacity(128);
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&flags.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&(self.answers.len() as u16).to_be_bytes());
        out.extend_from_slice(&(self.authority.len() as u16).to_be_bytes());
        out.extend_from_slice(&(self.additional.len() as u16).to_be_bytes());
        out.extend_from_slice(&encode_name(&self.name));
        out.extend_from_slice(&self.qtype.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        for rr in self.answers.iter().chain(&self.authority).chain(&self.additional) {
            rr.encode(&mut out);
        }
        out
    }
}

/// Answers `query` with one A record pointing back at the question name.
pub fn answer_for(query: &[u8], addr: Ipv4Addr, ttl: u32) -> Vec<u8> {
    let mut out = query.to_vec();
    out[2] = 0x81;
    out[3] = 0x80;
    out[6..8].copy_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&[0xC0, 0x0C]);
    out.extend_from_slice(&TYPE_A.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&ttl.to_be_bytes());
    out.extend_from_slice(&4u16.to_be_bytes());
    out.extend_from_slice(&addr.octets());
    out
}
