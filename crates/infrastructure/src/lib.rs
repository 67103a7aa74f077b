//! dnstrap infrastructure: the DNS interception engine and its adapters.
pub mod dns;
pub mod system;
