use crate::ports::DomainFilterPort;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Live edit sent by the rule store between full syncs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlocklistCommand {
    Add(String),
    AddWildcard(String),
    Remove(String),
    Allow(String),
    Disallow(String),
    Bulk {
        domains: Vec<String>,
        wildcards: Vec<String>,
    },
}

pub struct UpdateBlocklistUseCase {
    filter: Arc<dyn DomainFilterPort>,
}

impl UpdateBlocklistUseCase {
    pub fn new(filter: Arc<dyn DomainFilterPort>) -> Self {
        Self { filter }
    }

    pub fn execute(&self, command: BlocklistCommand) {
        debug!(?command, "Applying blocklist command");
        match command {
            BlocklistCommand::Add(domain) => self.filter.add_domain(&domain),
            BlocklistCommand::AddWildcard(pattern) => self.filter.add_wildcard(&pattern),
            BlocklistCommand::Remove(domain) => {
                self.filter.remove_domain(&domain);
            }
            BlocklistCommand::Allow(domain) => self.filter.allow_domain(&domain),
            BlocklistCommand::Disallow(domain) => {
                self.filter.disallow_domain(&domain);
            }
            BlocklistCommand::Bulk { domains, wildcards } => {
                self.filter.bulk_update(domains, wildcards)
            }
        }
    }

    /// Applies commands until every sender is dropped.
    pub async fn listen(self, mut commands: mpsc::Receiver<BlocklistCommand>) {
        while let Some(command) = commands.recv().await {
            self.execute(command);
        }
        debug!("Blocklist command channel closed");
    }
}
