use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// The DNS-trap decision handed to the external firewall manager: which
/// destination addresses must be routed into the virtual interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirewallRuleset {
    pub interface_name: String,
    pub trap_ipv4: Vec<Ipv4Addr>,
    pub trap_ipv6: Vec<Ipv6Addr>,
}

impl FirewallRuleset {
    pub fn new(interface_name: impl Into<String>, addresses: &[IpAddr]) -> Self {
        let mut ruleset = Self {
            interface_name: interface_name.into(),
            ..Self::default()
        };
        for addr in addresses {
            match addr {
                IpAddr::V4(v4) if !ruleset.trap_ipv4.contains(v4) => ruleset.trap_ipv4.push(*v4),
                IpAddr::V6(v6) if !ruleset.trap_ipv6.contains(v6) => ruleset.trap_ipv6.push(*v6),
                _ => {}
            }
        }
        ruleset
    }

    pub fn is_empty(&self) -> bool {
        self.trap_ipv4.is_empty() && self.trap_ipv6.is_empty()
    }

    pub fn len(&self) -> usize {
        self.trap_ipv4.len() + self.trap_ipv6.len()
    }
}
