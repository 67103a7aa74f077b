//! DNS-over-HTTPS (RFC 8484).
//!
//! Queries go out as `POST` with `application/dns-message` bodies over a
//! pooled HTTP/2 client. Each transport owns its client so the TLS verifier,
//! and with it the pin set, is per provider.

use super::pinning::{is_pin_rejection, pinned_client_config, unpinned_client_config};
use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use dnstrap_domain::{CertPin, DomainError};
use std::time::Duration;
use tracing::debug;

/// Expected content type for DNS-over-HTTPS responses (RFC 8484 §4.2.1)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";
const MAX_IDLE_PER_HOST: usize = 4;

pub struct HttpsTransport {
    url: String,
    client: reqwest::Client,
    pinned: bool,
}

impl HttpsTransport {
    /// Accepts only servers whose chain validates and carries one of `pins`.
    pub fn pinned(url: &str, pins: Vec<CertPin>) -> Result<Self, DomainError> {
        let tls = pinned_client_config(pins)?;
        Ok(Self {
            url: url.to_string(),
            client: Self::client(tls)?,
            pinned: true,
        })
    }

    /// CA validation only.
    pub fn unpinned(url: &str) -> Result<Self, DomainError> {
        let tls = unpinned_client_config()?;
        Ok(Self {
            url: url.to_string(),
            client: Self::client(tls)?,
            pinned: false,
        })
    }

    fn client(tls: rustls::ClientConfig) -> Result<reqwest::Client, DomainError> {
        reqwest::Client::builder()
            .use_preconfigured_tls(tls)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build()
            .map_err(|e| DomainError::ConfigError(format!("HTTP client: {}", e)))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn classify_error(&self, error: reqwest::Error) -> DomainError {
        if self.pinned && is_pin_rejection(&error) {
            return DomainError::CertificatePinMismatch {
                server: self.url.clone(),
            };
        }
        DomainError::TransportFailed {
            server: self.url.clone(),
            reason: error.to_string(),
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
            .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
            .body(message_bytes.to_vec())
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::UpstreamHttpStatus {
                server: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify_error(e))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        debug!(url = %self.url, message_len = message_bytes.len(), pinned = self.pinned, "Sending DoH query");

        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.url.clone(),
            })??;

        debug!(url = %self.url, response_len = bytes.len(), "DoH response received");

        Ok(TransportResponse {
            bytes,
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
