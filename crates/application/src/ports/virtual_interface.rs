use async_trait::async_trait;
use dnstrap_domain::DomainError;

/// User-space virtual network interface delivering raw IP frames.
#[async_trait]
pub trait VirtualInterfacePort: Send + Sync {
    /// `Ok(None)` once the descriptor has been torn down.
    async fn read_frame(&self) -> Result<Option<Vec<u8>>, DomainError>;
    async fn write_frame(&self, frame: &[u8]) -> Result<(), DomainError>;
}

/// Receives frames that are not DNS. Must not block.
pub trait PassThroughPort: Send + Sync {
    fn pass_through(&self, frame: Vec<u8>);
}
