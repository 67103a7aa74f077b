use crate::ports::FirewallPort;
use dnstrap_domain::{DomainError, FirewallRuleset};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;

/// Builds the DNS-trap rule set for the virtual interface and hands it to
/// the external firewall manager.
pub struct ApplyDnsTrapUseCase {
    firewall: Arc<dyn FirewallPort>,
}

impl ApplyDnsTrapUseCase {
    pub fn new(firewall: Arc<dyn FirewallPort>) -> Self {
        Self { firewall }
    }

    pub async fn execute(
        &self,
        interface_name: &str,
        trap_addresses: &[IpAddr],
    ) -> Result<FirewallRuleset, DomainError> {
        let ruleset = FirewallRuleset::new(interface_name, trap_addresses);
        if ruleset.is_empty() {
            return Err(DomainError::FirewallRejected(
                "no trap addresses configured".to_string(),
            ));
        }

        self.firewall.apply_rules(&ruleset).await?;

        info!(
            interface = %ruleset.interface_name,
            ipv4 = ruleset.trap_ipv4.len(),
            ipv6 = ruleset.trap_ipv6.len(),
            "DNS trap rules applied"
        );
        Ok(ruleset)
    }
}
