pub mod emitter;
pub mod logger;
pub mod metrics;
pub mod types;

pub use emitter::EngineEventEmitter;
pub use logger::EngineEventLogger;
pub use metrics::EngineStats;
pub use types::{EngineEvent, EngineWarning};
