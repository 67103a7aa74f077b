pub mod blocking;
pub mod cache;
pub mod errors;
pub mod interception;
pub mod logging;
pub mod root;
pub mod upstream;

pub use blocking::BlockingConfig;
pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use interception::InterceptionConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use upstream::{UpstreamConfig, UpstreamEndpointConfig};
