mod blocklist_source;
mod dns_cache_port;
mod domain_filter;
mod firewall_port;
mod upstream_resolver;
mod virtual_interface;

pub use blocklist_source::BlocklistSourcePort;
pub use dns_cache_port::{CacheMetricsSnapshot, DnsCachePort};
pub use domain_filter::DomainFilterPort;
pub use firewall_port::FirewallPort;
pub use upstream_resolver::{UpstreamAnswer, UpstreamResolverPort};
pub use virtual_interface::{PassThroughPort, VirtualInterfacePort};

// Re-export for convenience
pub use dnstrap_domain::{BlocklistRules, FirewallRuleset};
