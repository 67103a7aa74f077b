#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod dns_server_mock;
pub mod frames;
pub mod mock_upstream;

pub use builders::{
    answer_for, encode_name, query, query_with_flags, ResponseBuilder, TYPE_A, TYPE_AAAA, TYPE_CNAME,
    TYPE_MX,
};
pub use dns_server_mock::{MockBehavior, MockDnsServer};
pub use frames::{
    ones_complement, tcp_v4, tcp_v6, udp_v4, udp_v6, IpView, CLIENT_V4, CLIENT_V6, TRAP_V4, TRAP_V6,
};
pub use mock_upstream::{MockUpstream, ScriptedTransport, TransportScript};
