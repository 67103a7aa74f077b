use async_trait::async_trait;
use dnstrap_domain::{BlocklistRules, DomainError};

/// External rule store. One call returns the full current rule content.
#[async_trait]
pub trait BlocklistSourcePort: Send + Sync {
    async fn fetch_rules(&self) -> Result<BlocklistRules, DomainError>;
}
