//! DNS message codec.
//!
//! Every entry point takes untrusted bytes and returns `Result<_, CodecError>`;
//! no input makes it panic.

mod builder;
mod error;
pub mod name;
mod query;
mod response;

pub use builder::{
    build_nxdomain, build_refused, build_zero_ip, dispatch, synthesize_block, BLOCK_ANSWER_TTL,
};
pub use error::CodecError;
pub use query::{parse_domain, parse_query, parse_query_type, ParsedQuery};
pub use response::{patch_id, parse_response, AnswerRecord, ParsedResponse, RecordData};

pub const HEADER_LEN: usize = 12;

pub(crate) const FLAG_QR: u16 = 0x8000;
pub(crate) const FLAG_TC: u16 = 0x0200;
pub(crate) const FLAG_RD: u16 = 0x0100;
pub(crate) const FLAG_RA: u16 = 0x0080;

pub const RCODE_NOERROR: u8 = 0;
pub const RCODE_SERVFAIL: u8 = 2;
pub const RCODE_NXDOMAIN: u8 = 3;
pub const RCODE_REFUSED: u8 = 5;
