use crate::{CertPin, DomainError, UpstreamEndpoint};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamEndpointConfig {
    pub name: String,

    /// Plain UDP resolver, e.g. `9.9.9.9:53`.
    #[serde(default)]
    pub address: Option<String>,

    /// DNS-over-HTTPS endpoint, e.g. `https://1.1.1.1/dns-query`.
    #[serde(default)]
    pub url: Option<String>,

    /// `sha256/<base64>` SPKI pins: primary first, rotation backup second.
    #[serde(default)]
    pub pins: Vec<String>,

    #[serde(default = "default_priority")]
    pub priority: u8,
}

impl UpstreamEndpointConfig {
    pub fn to_endpoint(&self) -> Result<UpstreamEndpoint, DomainError> {
        match (&self.address, &self.url) {
            (Some(address), None) => {
                let addr: SocketAddr = address.parse().map_err(|e| {
                    DomainError::InvalidUpstreamEndpoint(format!(
                        "{}: bad address '{}': {}",
                        self.name, address, e
                    ))
                })?;
                Ok(UpstreamEndpoint::udp(self.name.as_str(), addr, self.priority))
            }
            (None, Some(url)) => {
                if !url.starts_with("https://") {
                    return Err(DomainError::InvalidUpstreamEndpoint(format!(
                        "{}: DoH url must be https: {}",
                        self.name, url
                    )));
                }
                if self.pins.is_empty() {
                    return Err(DomainError::InvalidUpstreamEndpoint(format!(
                        "{}: DoH endpoint requires at least one pin",
                        self.name
                    )));
                }
                let pins = self
                    .pins
                    .iter()
                    .map(|p| p.parse::<CertPin>())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(UpstreamEndpoint::doh(
                    self.name.as_str(),
                    url.as_str(),
                    pins,
                    self.priority,
                ))
            }
            _ => Err(DomainError::InvalidUpstreamEndpoint(format!(
                "{}: exactly one of 'address' or 'url' must be set",
                self.name
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// After every pinned provider failed, allow one request that only
    /// checks the CA chain. Always reported as a warning.
    #[serde(default = "default_true")]
    pub allow_unpinned_fallback: bool,

    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<UpstreamEndpointConfig>,
}

impl UpstreamConfig {
    /// Endpoints in failover order.
    pub fn resolved_endpoints(&self) -> Result<Vec<UpstreamEndpoint>, DomainError> {
        let mut endpoints = self
            .endpoints
            .iter()
            .map(UpstreamEndpointConfig::to_endpoint)
            .collect::<Result<Vec<_>, _>>()?;
        crate::upstream::sort_by_priority(&mut endpoints);
        Ok(endpoints)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
            allow_unpinned_fallback: true,
            endpoints: default_endpoints(),
        }
    }
}

fn default_query_timeout_ms() -> u64 {
    4000
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u8 {
    1
}

fn default_endpoints() -> Vec<UpstreamEndpointConfig> {
    vec![UpstreamEndpointConfig {
        name: "quad9".to_string(),
        address: Some("9.9.9.9:53".to_string()),
        url: None,
        pins: vec![],
        priority: 1,
    }]
}
