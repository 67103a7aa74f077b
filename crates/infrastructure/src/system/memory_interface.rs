use async_trait::async_trait;
use dnstrap_application::ports::VirtualInterfacePort;
use dnstrap_domain::DomainError;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// In-process virtual interface. Frames injected through the handle are
/// read by the engine; frames the engine writes land in the handle.
pub struct MemoryInterface {
    inbound: Mutex<mpsc::Receiver<Vec<u8>>>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

/// The "device" side of a [`MemoryInterface`].
pub struct MemoryInterfaceHandle {
    inject: Option<mpsc::Sender<Vec<u8>>>,
    written: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl MemoryInterface {
    pub fn new(capacity: usize) -> (Self, MemoryInterfaceHandle) {
        let (inject_tx, inject_rx) = mpsc::channel(capacity.max(1));
        let (written_tx, written_rx) = mpsc::unbounded_channel();
        let interface = Self {
            inbound: Mutex::new(inject_rx),
            outbound: written_tx,
        };
        let handle = MemoryInterfaceHandle {
            inject: Some(inject_tx),
            written: written_rx,
        };
        (interface, handle)
    }
}

#[async_trait]
impl VirtualInterfacePort for MemoryInterface {
    async fn read_frame(&self) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn write_frame(&self, frame: &[u8]) -> Result<(), DomainError> {
        self.outbound
            .send(frame.to_vec())
            .map_err(|_| DomainError::InterfaceClosed)
    }
}

impl MemoryInterfaceHandle {
    pub async fn inject(&self, frame: Vec<u8>) -> Result<(), DomainError> {
        let tx = self.inject.as_ref().ok_or(DomainError::InterfaceClosed)?;
        tx.send(frame).await.map_err(|_| DomainError::InterfaceClosed)
    }

    /// Tears the descriptor down: the engine's next read returns `None`
    /// once queued frames are drained.
    pub fn close(&mut self) {
        self.inject = None;
    }

    pub async fn next_written(&mut self, wait: Duration) -> Option<Vec<u8>> {
        tokio::time::timeout(wait, self.written.recv())
            .await
            .ok()
            .flatten()
    }

    pub fn try_written(&mut self) -> Option<Vec<u8>> {
        self.written.try_recv().ok()
    }
}
