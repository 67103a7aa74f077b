use super::BlocklistServices;
use dnstrap_application::ports::{DomainFilterPort, VirtualInterfacePort};
use dnstrap_domain::Config;
use dnstrap_infrastructure::dns::{
    EngineEventEmitter, EngineEventLogger, InterceptionLoop, InterceptionPorts, ResponseCache,
    UpstreamResolverClient,
};
use dnstrap_infrastructure::system::DroppingPassThrough;
use std::sync::Arc;
use tracing::info;

pub struct EngineServices {
    pub engine: Arc<InterceptionLoop>,
    pub cache: Arc<ResponseCache>,
}

impl EngineServices {
    pub fn new(
        config: &Config,
        blocklist: &BlocklistServices,
        interface: Arc<dyn VirtualInterfacePort>,
    ) -> anyhow::Result<Self> {
        let emitter = Self::setup_event_logger(config);

        let cache = Arc::new(ResponseCache::new(&config.cache));
        info!(
            positive_capacity = config.cache.positive_capacity,
            negative_capacity = config.cache.negative_capacity,
            "Response cache ready"
        );

        let upstream = Arc::new(UpstreamResolverClient::from_config(
            &config.upstream,
            emitter.clone(),
        )?);
        info!(
            routes = ?upstream.route_names(),
            timeout_ms = config.upstream.query_timeout_ms,
            unpinned_fallback = config.upstream.allow_unpinned_fallback,
            "Upstream resolvers configured"
        );

        let filter: Arc<dyn DomainFilterPort> = blocklist.matcher.clone();
        let engine = Arc::new(InterceptionLoop::new(
            &config.interception,
            InterceptionPorts {
                interface,
                pass_through: Arc::new(DroppingPassThrough::new()),
                filter,
                cache: cache.clone(),
                upstream,
                emitter,
            },
        ));

        Ok(Self { engine, cache })
    }

    fn setup_event_logger(config: &Config) -> EngineEventEmitter {
        let (emitter, event_rx) = EngineEventEmitter::new_enabled();
        EngineEventLogger::new()
            .with_allowed_queries(config.logging.log_queries)
            .start(event_rx);
        info!("Engine event logger started");
        emitter
    }
}
