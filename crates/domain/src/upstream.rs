use crate::DomainError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

const PIN_PREFIX: &str = "sha256/";

/// SHA-256 digest of a certificate's SubjectPublicKeyInfo.
///
/// Textual form is `sha256/<base64>`, the same notation mobile HTTP stacks use
/// for public-key pins.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertPin([u8; 32]);

impl CertPin {
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn matches(&self, digest: &[u8]) -> bool {
        self.0.as_slice() == digest
    }
}

impl FromStr for CertPin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s
            .trim()
            .strip_prefix(PIN_PREFIX)
            .ok_or_else(|| DomainError::InvalidCertificatePin(format!("missing sha256/ prefix: {}", s)))?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| DomainError::InvalidCertificatePin(format!("{}: {}", s, e)))?;
        let digest: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            DomainError::InvalidCertificatePin(format!("{}: expected 32 bytes, got {}", s, v.len()))
        })?;
        Ok(Self(digest))
    }
}

impl fmt::Display for CertPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PIN_PREFIX, BASE64.encode(self.0))
    }
}

impl fmt::Debug for CertPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertPin({})", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamTransport {
    Udp { addr: SocketAddr },
    Doh { url: Arc<str> },
}

impl UpstreamTransport {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            UpstreamTransport::Udp { .. } => "UDP",
            UpstreamTransport::Doh { .. } => "HTTPS",
        }
    }
}

impl fmt::Display for UpstreamTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamTransport::Udp { addr } => write!(f, "udp://{}", addr),
            UpstreamTransport::Doh { url } => write!(f, "{}", url),
        }
    }
}

/// One resolver the engine may forward to. Lower `priority` is tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEndpoint {
    pub name: Arc<str>,
    pub transport: UpstreamTransport,
    pub pins: Vec<CertPin>,
    pub priority: u8,
}

impl UpstreamEndpoint {
    pub fn udp(name: impl Into<Arc<str>>, addr: SocketAddr, priority: u8) -> Self {
        Self {
            name: name.into(),
            transport: UpstreamTransport::Udp { addr },
            pins: vec![],
            priority,
        }
    }

    pub fn doh(
        name: impl Into<Arc<str>>,
        url: impl Into<Arc<str>>,
        pins: Vec<CertPin>,
        priority: u8,
    ) -> Self {
        Self {
            name: name.into(),
            transport: UpstreamTransport::Doh { url: url.into() },
            pins,
            priority,
        }
    }

    pub fn is_doh(&self) -> bool {
        matches!(self.transport, UpstreamTransport::Doh { .. })
    }

    pub fn is_pinned(&self) -> bool {
        self.is_doh() && !self.pins.is_empty()
    }
}

/// Orders endpoints for failover: ascending priority, stable for ties.
pub fn sort_by_priority(endpoints: &mut [UpstreamEndpoint]) {
    endpoints.sort_by_key(|e| e.priority);
}
