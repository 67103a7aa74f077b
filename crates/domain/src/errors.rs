use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Invalid upstream endpoint: {0}")]
    InvalidUpstreamEndpoint(String),

    #[error("Invalid certificate pin: {0}")]
    InvalidCertificatePin(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport error from {server}: {reason}")]
    TransportFailed { server: String, reason: String },

    #[error("Certificate presented by {server} matches no configured pin")]
    CertificatePinMismatch { server: String },

    #[error("Upstream {server} answered HTTP {status}")]
    UpstreamHttpStatus { server: String, status: u16 },

    #[error("No upstream endpoints configured")]
    NoUpstreamEndpoints,

    #[error("All upstream endpoints failed")]
    AllUpstreamsFailed,

    #[error("Firewall rules rejected: {0}")]
    FirewallRejected(String),

    #[error("Virtual interface closed")]
    InterfaceClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Errors that mean "this provider is unusable right now, try the next one".
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            DomainError::TransportTimeout { .. }
                | DomainError::TransportFailed { .. }
                | DomainError::CertificatePinMismatch { .. }
                | DomainError::UpstreamHttpStatus { .. }
        )
    }
}
