use super::builders::answer_for;
use async_trait::async_trait;
use dnstrap_application::ports::{UpstreamAnswer, UpstreamResolverPort};
use dnstrap_domain::DomainError;
use dnstrap_infrastructure::dns::codec::parse_domain;
use dnstrap_infrastructure::dns::transport::{DnsTransport, TransportResponse};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum TransportScript {
    Answer(Ipv4Addr),
    PinMismatch,
    Fail,
    /// Sleeps past any timeout.
    Hang,
    /// Replies with a different transaction id.
    WrongId,
    /// Refuses the query itself rather than failing to deliver it.
    Reject,
}

/// In-process transport following a fixed script.
pub struct ScriptedTransport {
    name: String,
    script: TransportScript,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(name: &str, script: TransportScript) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsTransport for ScriptedTransport {
    async fn send(&self, message_bytes: &[u8], timeout: Duration) -> Result<TransportResponse, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let bytes = match &self.script {
            TransportScript::Answer(ip) => answer_for(message_bytes, *ip, 300),
            TransportScript::PinMismatch => {
                return Err(DomainError::CertificatePinMismatch {
                    server: self.name.clone(),
                })
            }
            TransportScript::Fail => {
                return Err(DomainError::TransportFailed {
                    server: self.name.clone(),
                    reason: "connection refused".to_string(),
                })
            }
            TransportScript::Hang => {
                tokio::time::sleep(timeout + Duration::from_millis(50)).await;
                return Err(DomainError::TransportTimeout {
                    server: self.name.clone(),
                });
            }
            TransportScript::Reject => {
                return Err(DomainError::InvalidDnsMessage(
                    "query exceeds transport limits".to_string(),
                ))
            }
            TransportScript::WrongId => {
                let mut bytes = answer_for(message_bytes, Ipv4Addr::new(6, 6, 6, 6), 300);
                bytes[0] ^= 0xFF;
                bytes
            }
        };
        Ok(TransportResponse {
            bytes,
            protocol_used: "MOCK",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "MOCK"
    }
}

/// Upstream port answering from a per-domain table. Unknown names fail.
#[derive(Default)]
pub struct MockUpstream {
    answers: Mutex<HashMap<String, Vec<u8>>>,
    delay: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
}

impl MockUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `response` is any upstream answer; its id is rewritten per query.
    pub fn answer(&self, domain: &str, response: Vec<u8>) {
        self.answers
            .lock()
            .unwrap()
            .insert(domain.to_string(), response);
    }

    pub fn delay(&self, domain: &str, delay: Duration) {
        self.delay.lock().unwrap().insert(domain.to_string(), delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamResolverPort for MockUpstream {
    async fn resolve(&self, query: &[u8]) -> Result<UpstreamAnswer, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let domain = parse_domain(query).map_err(|e| DomainError::InvalidDnsMessage(e.to_string()))?;

        let delay = self.delay.lock().unwrap().get(&domain).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.answers.lock().unwrap().get(&domain).cloned();
        match response {
            Some(mut bytes) => {
                bytes[0..2].copy_from_slice(&query[0..2]);
                Ok(UpstreamAnswer {
                    bytes,
                    upstream: Arc::from("mock"),
                    latency: delay.unwrap_or_default(),
                    pinned: true,
                })
            }
            None => Err(DomainError::AllUpstreamsFailed),
        }
    }
}
