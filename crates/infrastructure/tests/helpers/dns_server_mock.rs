use super::builders::answer_for;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// One A record, TTL 60.
    Answer(Ipv4Addr),
    /// First a datagram with a wrong id, then the real answer.
    WrongIdFirst(Ipv4Addr),
    /// Never replies.
    Silent,
}

/// Plain-UDP resolver on an ephemeral loopback port.
pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let query = &buf[..len];
                        if query.len() < 12 {
                            continue;
                        }
                        match behavior {
                            MockBehavior::Answer(ip) => {
                                let _ = socket.send_to(&answer_for(query, ip, 60), peer).await;
                            }
                            MockBehavior::WrongIdFirst(ip) => {
                                let mut bogus = answer_for(query, Ipv4Addr::new(6, 6, 6, 6), 60);
                                bogus[0] ^= 0xFF;
                                let _ = socket.send_to(&bogus, peer).await;
                                let _ = socket.send_to(&answer_for(query, ip, 60), peer).await;
                            }
                            MockBehavior::Silent => {}
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
