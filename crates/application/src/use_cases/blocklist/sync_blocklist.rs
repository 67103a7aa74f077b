use crate::ports::{BlocklistSourcePort, DomainFilterPort};
use dnstrap_domain::DomainError;
use std::sync::Arc;
use tracing::info;

/// Pulls the full rule content from the rule store and publishes it as one
/// new blocklist snapshot.
pub struct SyncBlocklistUseCase {
    source: Arc<dyn BlocklistSourcePort>,
    filter: Arc<dyn DomainFilterPort>,
}

impl SyncBlocklistUseCase {
    pub fn new(source: Arc<dyn BlocklistSourcePort>, filter: Arc<dyn DomainFilterPort>) -> Self {
        Self { source, filter }
    }

    /// Returns the number of rules now active.
    pub async fn execute(&self) -> Result<usize, DomainError> {
        let rules = self.source.fetch_rules().await?;

        let blocked = rules.blocked.len();
        let wildcards = rules.wildcards.len();
        let allowed = rules.allowed.len();

        self.filter.replace_rules(rules);

        let total = self.filter.rule_count();
        info!(blocked, wildcards, allowed, total, "Blocklist synchronized");
        Ok(total)
    }
}
