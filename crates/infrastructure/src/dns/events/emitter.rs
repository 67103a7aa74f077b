use super::{EngineEvent, EngineWarning};
use dnstrap_domain::QueryLog;
use tokio::sync::mpsc;

/// Non-blocking hand-off of engine events to the external log collector.
/// Sends never wait; a disabled emitter or a dropped receiver discards.
#[derive(Clone)]
pub struct EngineEventEmitter {
    sender: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl EngineEventEmitter {
    pub fn new_disabled() -> Self {
        Self { sender: None }
    }

    pub fn new_enabled() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let emitter = Self { sender: Some(tx) };
        (emitter, rx)
    }

    pub fn emit(&self, event: EngineEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }

    pub fn query(&self, log: QueryLog) {
        self.emit(EngineEvent::Query(log));
    }

    pub fn warning(&self, warning: EngineWarning) {
        self.emit(EngineEvent::Warning(warning));
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl Default for EngineEventEmitter {
    fn default() -> Self {
        Self::new_disabled()
    }
}

impl std::fmt::Debug for EngineEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEventEmitter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
