use async_trait::async_trait;
use dnstrap_domain::{DomainError, FirewallRuleset};

/// Hand-off to the external firewall-rule manager.
#[async_trait]
pub trait FirewallPort: Send + Sync {
    async fn apply_rules(&self, ruleset: &FirewallRuleset) -> Result<(), DomainError>;
}
