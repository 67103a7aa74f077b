use async_trait::async_trait;
use dnstrap_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UpstreamAnswer {
    pub bytes: Vec<u8>,
    /// Name of the endpoint that produced the answer.
    pub upstream: Arc<str>,
    pub latency: Duration,
    /// False only for the last-resort unpinned fallback.
    pub pinned: bool,
}

#[async_trait]
pub trait UpstreamResolverPort: Send + Sync {
    /// Forwards a raw DNS query and returns the raw answer. Tries endpoints
    /// in priority order; fails only when every endpoint failed.
    async fn resolve(&self, query: &[u8]) -> Result<UpstreamAnswer, DomainError>;
}
