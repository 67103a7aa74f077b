use thiserror::Error;

/// Why a byte sequence could not be read or answered as DNS.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("message is empty")]
    Empty,

    #[error("message truncated at offset {0}")]
    Truncated(usize),

    #[error("label length {0} exceeds 63")]
    LabelTooLong(usize),

    #[error("domain name exceeds 255 octets")]
    NameTooLong,

    #[error("compression pointer at offset {0} is invalid")]
    BadPointer(usize),

    #[error("too many compression pointers")]
    PointerLoop,

    #[error("reserved label type 0x{0:02x}")]
    ReservedLabelType(u8),

    #[error("label contains non-ASCII or control bytes")]
    InvalidLabel,

    #[error("message has no question")]
    NoQuestion,

    #[error("expected a query, got a response")]
    NotAQuery,

    #[error("expected a response, got a query")]
    NotAResponse,
}
