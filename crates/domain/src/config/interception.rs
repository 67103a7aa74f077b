use crate::BlockPolicy;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterceptionConfig {
    #[serde(default = "default_interface_name")]
    pub interface_name: String,

    #[serde(default = "default_mtu")]
    pub mtu: usize,

    #[serde(default)]
    pub block_policy: BlockPolicy,

    /// Attach a synthetic SOA to NXDOMAIN block answers.
    #[serde(default = "default_true")]
    pub nxdomain_soa: bool,

    /// Virtual DNS server addresses the firewall routes into the interface.
    #[serde(default = "default_trap_addresses")]
    pub trap_addresses: Vec<IpAddr>,

    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for InterceptionConfig {
    fn default() -> Self {
        Self {
            interface_name: default_interface_name(),
            mtu: default_mtu(),
            block_policy: BlockPolicy::default(),
            nxdomain_soa: true,
            trap_addresses: default_trap_addresses(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_interface_name() -> String {
    "dnstrap0".to_string()
}

fn default_mtu() -> usize {
    1500
}

fn default_true() -> bool {
    true
}

fn default_trap_addresses() -> Vec<IpAddr> {
    vec![IpAddr::from([10, 111, 222, 1]), IpAddr::from([10, 111, 222, 2])]
}

fn default_max_in_flight() -> usize {
    512
}
