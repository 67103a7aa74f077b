//! Per-frame state machine driving the codec, matcher, cache, framer,
//! cloak detector and upstream client.

mod engine;
mod outcome;

pub use engine::{InterceptionLoop, InterceptionPorts};
pub use outcome::{FrameOutcome, PendingForward, ReplyRoute};
