//! Plain DNS over UDP (RFC 1035 §4.2.1).

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use dnstrap_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn failed(&self, reason: impl std::fmt::Display) -> DomainError {
        DomainError::TransportFailed {
            server: self.server_addr.to_string(),
            reason: reason.to_string(),
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.failed(format!("bind: {}", e)))?;
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| self.failed(format!("connect: {}", e)))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| self.failed(format!("send: {}", e)))?;
        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let received = socket
                .recv(&mut recv_buf)
                .await
                .map_err(|e| self.failed(format!("recv: {}", e)))?;

            // Drop stray datagrams that do not answer this query.
            if received < 2 || message_bytes.len() < 2 || recv_buf[..2] != message_bytes[..2] {
                warn!(server = %self.server_addr, received, "Ignoring mismatched UDP response");
                continue;
            }

            recv_buf.truncate(received);
            debug!(server = %self.server_addr, bytes_received = received, "UDP response received");
            return Ok(recv_buf);
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })??;

        Ok(TransportResponse {
            bytes,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_round_trip_against_local_echo() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            buf[2] |= 0x80;
            server.send_to(&buf[..len], peer).await.unwrap();
        });

        let transport = UdpTransport::new(addr);
        let query = [0xAB, 0xCD, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1];
        let response = transport
            .send(&query, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(&response.bytes[..2], &[0xAB, 0xCD]);
        assert_eq!(response.protocol_used, "UDP");
    }

    #[tokio::test]
    async fn test_udp_timeout_is_reported() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = UdpTransport::new(silent.local_addr().unwrap());

        let result = transport
            .send(&[0, 1, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1], Duration::from_millis(50))
            .await;

        assert!(matches!(result, Err(DomainError::TransportTimeout { .. })));
    }
}
