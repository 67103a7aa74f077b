#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_ports;

pub use mock_ports::{MockBlocklistSource, MockDnsCache, MockDomainFilter, MockFirewall};
