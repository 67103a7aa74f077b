use dnstrap_application::ports::PassThroughPort;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::trace;

/// Keeps non-DNS frames for inspection.
#[derive(Default)]
pub struct CollectingPassThrough {
    frames: Mutex<Vec<Vec<u8>>>,
}

impl CollectingPassThrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.frames.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl PassThroughPort for CollectingPassThrough {
    fn pass_through(&self, frame: Vec<u8>) {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(frame);
    }
}

/// Discards non-DNS frames. Only trap addresses are routed into the
/// interface, so anything else reaching it has nowhere to go.
#[derive(Default)]
pub struct DroppingPassThrough {
    dropped: AtomicU64,
}

impl DroppingPassThrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl PassThroughPort for DroppingPassThrough {
    fn pass_through(&self, frame: Vec<u8>) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        trace!(len = frame.len(), "Non-DNS frame discarded");
    }
}
