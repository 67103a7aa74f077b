//! dnstrap domain layer
pub mod block_policy;
pub mod blocklist_rules;
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod firewall;
pub mod query_log;
pub mod upstream;

pub use block_policy::BlockPolicy;
pub use blocklist_rules::BlocklistRules;
pub use config::{CliOverrides, Config};
pub use dns_record::RecordType;
pub use errors::DomainError;
pub use firewall::FirewallRuleset;
pub use query_log::{BlockReason, QueryLog, QueryProtocol, QueryStats, ResponseStatus};
pub use upstream::{CertPin, UpstreamEndpoint, UpstreamTransport};
