pub mod https;
pub mod pinning;
pub mod udp;

use async_trait::async_trait;
use dnstrap_domain::{DomainError, UpstreamEndpoint, UpstreamTransport};
use std::sync::Arc;
use std::time::Duration;

pub use https::HttpsTransport;
pub use udp::UdpTransport;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,
    pub protocol_used: &'static str,
}

/// One upstream wire. `timeout` bounds the whole exchange.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Builds the transport for a configured endpoint. DoH endpoints get a TLS
/// stack that only accepts their pinned keys.
pub fn create_transport(endpoint: &UpstreamEndpoint) -> Result<Arc<dyn DnsTransport>, DomainError> {
    match &endpoint.transport {
        UpstreamTransport::Udp { addr } => Ok(Arc::new(UdpTransport::new(*addr))),
        UpstreamTransport::Doh { url } => {
            if endpoint.pins.is_empty() {
                return Err(DomainError::InvalidUpstreamEndpoint(format!(
                    "{}: DoH endpoint requires at least one pin",
                    endpoint.name
                )));
            }
            Ok(Arc::new(HttpsTransport::pinned(url, endpoint.pins.clone())?))
        }
    }
}
