use crate::dns::events::{EngineEventEmitter, EngineWarning};
use crate::dns::transport::{create_transport, DnsTransport, HttpsTransport};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use dnstrap_application::ports::{UpstreamAnswer, UpstreamResolverPort};
use dnstrap_domain::config::UpstreamConfig;
use dnstrap_domain::{DomainError, UpstreamEndpoint, UpstreamTransport};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct UpstreamRoute {
    pub name: Arc<str>,
    pub transport: Arc<dyn DnsTransport>,
}

impl UpstreamRoute {
    pub fn new(name: impl Into<Arc<str>>, transport: Arc<dyn DnsTransport>) -> Self {
        Self {
            name: name.into(),
            transport,
        }
    }
}

/// Endpoints in failover order plus the optional CA-only fallback.
/// Replaced as a whole on configuration change.
#[derive(Clone, Default)]
pub struct RouteTable {
    pub routes: Vec<UpstreamRoute>,
    pub fallback: Option<UpstreamRoute>,
}

impl RouteTable {
    /// Builds transports for `endpoints` (already in priority order). The
    /// fallback reuses the first DoH endpoint's URL without pins.
    pub fn build(endpoints: &[UpstreamEndpoint], allow_unpinned_fallback: bool) -> Result<Self, DomainError> {
        let routes = endpoints
            .iter()
            .map(|ep| Ok(UpstreamRoute::new(ep.name.clone(), create_transport(ep)?)))
            .collect::<Result<Vec<_>, DomainError>>()?;

        let fallback = if allow_unpinned_fallback {
            endpoints
                .iter()
                .find_map(|ep| match &ep.transport {
                    UpstreamTransport::Doh { url } => Some((ep.name.clone(), url.clone())),
                    UpstreamTransport::Udp { .. } => None,
                })
                .map(|(name, url)| -> Result<UpstreamRoute, DomainError> {
                    Ok(UpstreamRoute::new(name, Arc::new(HttpsTransport::unpinned(&url)?)))
                })
                .transpose()?
        } else {
            None
        };

        Ok(Self { routes, fallback })
    }
}

/// Forwards raw queries to the configured resolvers in priority order.
///
/// Each attempt is bounded by `timeout`; a transport failure or timeout moves
/// on to the next endpoint. Any other error is returned as is. No retries.
pub struct UpstreamResolverClient {
    table: ArcSwap<RouteTable>,
    timeout: Duration,
    emitter: EngineEventEmitter,
}

impl UpstreamResolverClient {
    pub fn new(table: RouteTable, timeout: Duration, emitter: EngineEventEmitter) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
            timeout,
            emitter,
        }
    }

    pub fn from_config(config: &UpstreamConfig, emitter: EngineEventEmitter) -> Result<Self, DomainError> {
        let endpoints = config.resolved_endpoints()?;
        let table = RouteTable::build(&endpoints, config.allow_unpinned_fallback)?;
        Ok(Self::new(
            table,
            Duration::from_millis(config.query_timeout_ms),
            emitter,
        ))
    }

    /// Swaps in a new endpoint list; in-flight queries finish on the old one.
    pub fn replace_routes(&self, table: RouteTable) {
        debug!(routes = table.routes.len(), fallback = table.fallback.is_some(), "Upstream routes replaced");
        self.table.store(Arc::new(table));
    }

    pub fn route_names(&self) -> Vec<Arc<str>> {
        self.table.load().routes.iter().map(|r| r.name.clone()).collect()
    }

    async fn attempt(&self, route: &UpstreamRoute, query: &[u8]) -> Result<(Vec<u8>, Duration), DomainError> {
        let start = Instant::now();
        let response = route.transport.send(query, self.timeout).await?;
        let latency = start.elapsed();
        if !answers_query(query, &response.bytes) {
            return Err(DomainError::TransportFailed {
                server: route.name.to_string(),
                reason: "response does not answer the query".to_string(),
            });
        }
        Ok((response.bytes, latency))
    }
}

/// Header sanity: long enough, QR set, same transaction id.
fn answers_query(query: &[u8], response: &[u8]) -> bool {
    response.len() >= 12 && query.len() >= 2 && response[..2] == query[..2] && response[2] & 0x80 != 0
}

#[async_trait]
impl UpstreamResolverPort for UpstreamResolverClient {
    async fn resolve(&self, query: &[u8]) -> Result<UpstreamAnswer, DomainError> {
        let table = self.table.load_full();
        if table.routes.is_empty() && table.fallback.is_none() {
            return Err(DomainError::NoUpstreamEndpoints);
        }

        for (position, route) in table.routes.iter().enumerate() {
            match self.attempt(route, query).await {
                Ok((bytes, latency)) => {
                    debug!(upstream = %route.name, position, latency_ms = latency.as_millis() as u64, "Upstream responded");
                    return Ok(UpstreamAnswer {
                        bytes,
                        upstream: route.name.clone(),
                        latency,
                        pinned: true,
                    });
                }
                Err(e) if e.is_transport_failure() => {
                    warn!(upstream = %route.name, protocol = route.transport.protocol_name(), error = %e, position, "Failing over");
                }
                Err(e) => {
                    warn!(upstream = %route.name, error = %e, "Query rejected before reaching the upstream");
                    return Err(e);
                }
            }
        }

        if let Some(fallback) = &table.fallback {
            warn!(upstream = %fallback.name, "All pinned upstreams failed, attempting unpinned fallback");
            let result = self.attempt(fallback, query).await;
            self.emitter.warning(EngineWarning::UnpinnedFallback {
                provider: fallback.name.clone(),
                succeeded: result.is_ok(),
            });
            match result {
                Ok((bytes, latency)) => {
                    return Ok(UpstreamAnswer {
                        bytes,
                        upstream: fallback.name.clone(),
                        latency,
                        pinned: false,
                    });
                }
                Err(e) => {
                    warn!(upstream = %fallback.name, error = %e, "Unpinned fallback failed");
                }
            }
        }

        Err(DomainError::AllUpstreamsFailed)
    }
}
