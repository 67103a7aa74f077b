pub mod block_filter;
pub mod cache;
pub mod cname;
pub mod codec;
pub mod events;
pub mod intercept;
pub mod packet;
pub mod transport;
pub mod upstream;

pub use block_filter::{BlocklistMatcher, ConfigBlocklistSource, Verdict};
pub use cache::{CacheMetrics, InsertOutcome, RejectReason, ResponseCache};
pub use cname::{CloakVerdict, CnameCloakDetector};
pub use events::{EngineEvent, EngineEventEmitter, EngineEventLogger, EngineStats, EngineWarning};
pub use intercept::{FrameOutcome, InterceptionLoop, InterceptionPorts};
pub use upstream::{RouteTable, UpstreamResolverClient, UpstreamRoute};
