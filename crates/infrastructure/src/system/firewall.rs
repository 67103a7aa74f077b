use async_trait::async_trait;
use dnstrap_application::ports::FirewallPort;
use dnstrap_domain::{DomainError, FirewallRuleset};
use std::sync::Mutex;
use tracing::info;

/// Firewall hand-off that only records and logs the ruleset. The actual
/// packet filter is owned by an external manager.
#[derive(Default)]
pub struct LogOnlyFirewall {
    applied: Mutex<Option<FirewallRuleset>>,
}

impl LogOnlyFirewall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_applied(&self) -> Option<FirewallRuleset> {
        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl FirewallPort for LogOnlyFirewall {
    async fn apply_rules(&self, ruleset: &FirewallRuleset) -> Result<(), DomainError> {
        for addr in &ruleset.trap_ipv4 {
            info!(interface = %ruleset.interface_name, trap = %addr, "DNS trap route (IPv4)");
        }
        for addr in &ruleset.trap_ipv6 {
            info!(interface = %ruleset.interface_name, trap = %addr, "DNS trap route (IPv6)");
        }
        *self.applied.lock().unwrap_or_else(|e| e.into_inner()) = Some(ruleset.clone());
        Ok(())
    }
}
