use super::outcome::{FrameOutcome, PendingForward, ReplyRoute, Step};
use crate::dns::cache::ResponseCache;
use crate::dns::cname::{alias_chain, resolved_addresses, CnameCloakDetector};
use crate::dns::codec::{parse_query, parse_response, patch_id, synthesize_block, ParsedQuery};
use crate::dns::events::{EngineEventEmitter, EngineStats, EngineWarning};
use crate::dns::packet::{build_tcp_rst, build_udp_reply, classify, Classified, DnsFrame};
use arc_swap::ArcSwap;
use dnstrap_application::ports::{
    DomainFilterPort, PassThroughPort, UpstreamAnswer, UpstreamResolverPort, VirtualInterfacePort,
};
use dnstrap_domain::config::InterceptionConfig;
use dnstrap_domain::{
    BlockPolicy, BlockReason, DomainError, QueryLog, QueryProtocol, ResponseStatus,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Collaborators injected into the loop.
pub struct InterceptionPorts {
    pub interface: Arc<dyn VirtualInterfacePort>,
    pub pass_through: Arc<dyn PassThroughPort>,
    pub filter: Arc<dyn DomainFilterPort>,
    pub cache: Arc<ResponseCache>,
    pub upstream: Arc<dyn UpstreamResolverPort>,
    pub emitter: EngineEventEmitter,
}

type Completion = (PendingForward, Result<UpstreamAnswer, DomainError>);

/// The single driver reading frames from the virtual interface.
///
/// Cache hits and block decisions are answered inline. Allowed queries are
/// forwarded on spawned tasks owned by a `JoinSet`; their completions come
/// back through the same `select!` so the reader never waits on the network.
pub struct InterceptionLoop {
    interface: Arc<dyn VirtualInterfacePort>,
    pass_through: Arc<dyn PassThroughPort>,
    filter: Arc<dyn DomainFilterPort>,
    cache: Arc<ResponseCache>,
    upstream: Arc<dyn UpstreamResolverPort>,
    cloak: CnameCloakDetector,
    emitter: EngineEventEmitter,
    stats: Arc<EngineStats>,
    policy: ArcSwap<BlockPolicy>,
    include_soa: bool,
    max_in_flight: usize,
}

impl InterceptionLoop {
    pub fn new(config: &InterceptionConfig, ports: InterceptionPorts) -> Self {
        Self {
            cloak: CnameCloakDetector::new(ports.filter.clone()),
            interface: ports.interface,
            pass_through: ports.pass_through,
            filter: ports.filter,
            cache: ports.cache,
            upstream: ports.upstream,
            emitter: ports.emitter,
            stats: Arc::new(EngineStats::new()),
            policy: ArcSwap::from_pointee(config.block_policy),
            include_soa: config.nxdomain_soa,
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    pub fn stats(&self) -> Arc<EngineStats> {
        self.stats.clone()
    }

    pub fn block_policy(&self) -> BlockPolicy {
        **self.policy.load()
    }

    /// Takes effect from the next decision on.
    pub fn set_block_policy(&self, policy: BlockPolicy) {
        info!(policy = %policy, "Block policy changed");
        self.policy.store(Arc::new(policy));
    }

    /// Reads frames until the interface closes or `shutdown` fires.
    ///
    /// Forwards still pending at exit are abandoned with the `JoinSet`.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) -> Result<(), DomainError> {
        let mut in_flight: JoinSet<Completion> = JoinSet::new();
        info!(max_in_flight = self.max_in_flight, policy = %self.block_policy(), "Interception loop started");

        let result = loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Interception loop cancelled");
                    break Ok(());
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    match joined {
                        Ok((pending, answer)) => {
                            let outcome = self.complete(pending, answer).await;
                            trace!(?outcome, "Forward completed");
                        }
                        Err(e) => warn!(error = %e, "Forward task aborted"),
                    }
                }

                read = self.interface.read_frame() => match read {
                    Ok(Some(frame)) => match self.step(&frame).await {
                        Step::Done(outcome) => trace!(?outcome, "Frame handled"),
                        Step::Forward(pending) => {
                            let outcome = self.spawn_forward(pending, &mut in_flight);
                            trace!(?outcome, "Frame handled");
                        }
                    },
                    Ok(None) => {
                        info!("Virtual interface closed");
                        break Ok(());
                    }
                    Err(e) => {
                        error!(error = %e, "Virtual interface read failed");
                        break Err(e);
                    }
                },
            }
        };

        if !in_flight.is_empty() {
            debug!(abandoned = in_flight.len(), "Abandoning in-flight forwards");
        }
        in_flight.abort_all();
        result
    }

    /// Hands `pending` to a forward task unless `max_in_flight` are already
    /// running, in which case the query is dropped.
    fn spawn_forward(&self, pending: PendingForward, in_flight: &mut JoinSet<Completion>) -> FrameOutcome {
        if in_flight.len() >= self.max_in_flight {
            warn!(domain = %pending.query.domain, limit = self.max_in_flight, "Too many forwards in flight, dropping query");
            self.stats.record_throttled();
            self.emitter.warning(EngineWarning::InFlightLimit { limit: self.max_in_flight });
            return FrameOutcome::Throttled;
        }
        let upstream = self.upstream.clone();
        in_flight.spawn(async move {
            let answer = upstream.resolve(&pending.raw).await;
            (pending, answer)
        });
        FrameOutcome::Forwarded
    }

    /// Runs one frame to completion, awaiting the upstream inline when the
    /// query is forwarded.
    pub async fn handle_frame(&self, frame: &[u8]) -> FrameOutcome {
        match self.step(frame).await {
            Step::Done(outcome) => outcome,
            Step::Forward(pending) => {
                let answer = self.upstream.resolve(&pending.raw).await;
                self.complete(pending, answer).await
            }
        }
    }

    async fn step(&self, frame: &[u8]) -> Step {
        let received_at = Instant::now();
        let dns = match classify(frame) {
            Ok(Classified::Dns(dns)) => dns,
            Ok(Classified::NotDns) => {
                self.pass_through.pass_through(frame.to_vec());
                return Step::Done(FrameOutcome::PassedThrough);
            }
            Err(e) => {
                self.stats.record_malformed();
                debug!(error = %e, len = frame.len(), "Dropping malformed frame");
                return Step::Done(FrameOutcome::Malformed);
            }
        };

        if dns.is_tcp() && dns.is_ipv6() {
            debug!(src = %dns.src, "TCP DNS over IPv6 is not handled");
            return Step::Done(FrameOutcome::Unhandled);
        }

        let Some(message) = dns.dns_message() else {
            self.stats.record_malformed();
            debug!(src = %dns.src, "DNS payload missing");
            return Step::Done(FrameOutcome::Malformed);
        };
        let query = match parse_query(message) {
            Ok(query) => query,
            Err(e) => {
                self.stats.record_malformed();
                debug!(error = %e, src = %dns.src, "Dropping unparsable DNS query");
                return Step::Done(FrameOutcome::Malformed);
            }
        };

        if dns.is_tcp() {
            return Step::Done(self.handle_tcp(&dns, &query, received_at).await);
        }

        let route = ReplyRoute::of(&dns);

        if let Some(cached) = self.cache.lookup(&query.domain, query.record_type, query.id) {
            return Step::Done(self.answer_from_cache(route, &query, cached, received_at).await);
        }

        if self.filter.is_blocked(&query.domain) {
            return Step::Done(self.answer_blocked(route, &query, message, received_at).await);
        }

        debug!(domain = %query.domain, qtype = %query.record_type, "Forwarding query");
        Step::Forward(PendingForward {
            route,
            query,
            raw: message.to_vec(),
            received_at,
        })
    }

    async fn handle_tcp(
        &self,
        dns: &DnsFrame<'_>,
        query: &ParsedQuery,
        received_at: Instant,
    ) -> FrameOutcome {
        if !self.filter.is_blocked(&query.domain) {
            debug!(domain = %query.domain, "Allowed TCP query dropped, client falls back to UDP");
            return FrameOutcome::TcpDropped;
        }

        let rst = match build_tcp_rst(dns) {
            Ok(rst) => rst,
            Err(e) => {
                debug!(error = %e, domain = %query.domain, "Could not build TCP reset");
                return FrameOutcome::Malformed;
            }
        };
        if !self.write(&rst, &query.domain).await {
            return FrameOutcome::WriteFailed;
        }

        self.stats.record_query();
        self.stats.record_blocked();
        let mut log = self.log_for(query, QueryProtocol::Tcp, received_at);
        log.blocked = true;
        log.block_reason = Some(BlockReason::Blocklist);
        log.status = ResponseStatus::TcpReset;
        self.emitter.query(log);

        debug!(domain = %query.domain, "Blocked TCP query reset");
        FrameOutcome::TcpReset
    }

    async fn answer_from_cache(
        &self,
        route: ReplyRoute,
        query: &ParsedQuery,
        cached: Vec<u8>,
        received_at: Instant,
    ) -> FrameOutcome {
        if !self.reply(route, &cached, &query.domain).await {
            return FrameOutcome::WriteFailed;
        }

        self.stats.record_query();
        let mut log = self.log_for(query, QueryProtocol::Udp, received_at);
        log.cache_hit = true;
        if let Ok(parsed) = parse_response(&cached) {
            log.status = ResponseStatus::from_rcode(parsed.rcode);
            log.cname_chain = alias_chain(&parsed);
            log.resolved_ips = resolved_addresses(&parsed);
        }
        self.emitter.query(log);

        debug!(domain = %query.domain, qtype = %query.record_type, "Cache hit");
        FrameOutcome::CacheHit
    }

    async fn answer_blocked(
        &self,
        route: ReplyRoute,
        query: &ParsedQuery,
        raw: &[u8],
        received_at: Instant,
    ) -> FrameOutcome {
        let policy = self.block_policy();
        let response = match synthesize_block(policy, query, raw, self.include_soa) {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, domain = %query.domain, "Could not synthesize block answer");
                return FrameOutcome::Malformed;
            }
        };
        if !self.reply(route, &response, &query.domain).await {
            return FrameOutcome::WriteFailed;
        }

        self.stats.record_query();
        self.stats.record_blocked();
        let mut log = self.log_for(query, QueryProtocol::Udp, received_at);
        log.blocked = true;
        log.block_reason = Some(BlockReason::Blocklist);
        fill_from_response(&mut log, &response);
        self.emitter.query(log);

        debug!(domain = %query.domain, policy = %policy, "Blocked query");
        FrameOutcome::Blocked
    }

    /// Handles one upstream completion: cloak check, cache store, reply.
    pub async fn complete(
        &self,
        pending: PendingForward,
        answer: Result<UpstreamAnswer, DomainError>,
    ) -> FrameOutcome {
        let PendingForward {
            route,
            query,
            raw,
            received_at,
        } = pending;

        let answer = match answer {
            Ok(answer) => answer,
            Err(e) => {
                self.stats.record_upstream_failure();
                warn!(domain = %query.domain, error = %e, "Upstream resolution failed");
                return FrameOutcome::UpstreamFailed;
            }
        };

        let parsed = match parse_response(&answer.bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.stats.record_upstream_failure();
                warn!(domain = %query.domain, upstream = %answer.upstream, error = %e, "Unparsable upstream answer");
                return FrameOutcome::UpstreamFailed;
            }
        };

        let verdict = self.cloak.inspect(&parsed);
        let mut log = self.log_for(&query, QueryProtocol::Udp, received_at);
        log.upstream = Some(answer.upstream.clone());
        log.cname_chain = verdict.chain.clone();

        let (response, outcome) = if let Some(target) = verdict.blocked_target.as_deref() {
            let policy = self.block_policy();
            let response = match synthesize_block(policy, &query, &raw, self.include_soa) {
                Ok(response) => response,
                Err(e) => {
                    debug!(error = %e, domain = %query.domain, "Could not synthesize cloak block answer");
                    return FrameOutcome::Malformed;
                }
            };
            info!(domain = %query.domain, target = %target, policy = %policy, "CNAME cloak blocked");
            self.stats.record_cname_cloak();
            self.stats.record_blocked();
            log.blocked = true;
            log.block_reason = Some(BlockReason::CnameCloak);
            fill_from_response(&mut log, &response);
            (response, FrameOutcome::CloakBlocked)
        } else {
            self.cache.insert_parsed(
                &query.domain,
                query.record_type,
                &answer.bytes,
                &parsed,
                Instant::now(),
            );
            let mut response = answer.bytes;
            patch_id(&mut response, query.id);
            log.status = ResponseStatus::from_rcode(parsed.rcode);
            log.resolved_ips = resolved_addresses(&parsed);
            (response, FrameOutcome::Answered)
        };

        if !self.reply(route, &response, &query.domain).await {
            return FrameOutcome::WriteFailed;
        }

        self.stats.record_query();
        self.emitter.query(log);
        debug!(domain = %query.domain, upstream = %answer.upstream, ?outcome, "Upstream answer relayed");
        outcome
    }

    async fn reply(&self, route: ReplyRoute, dns: &[u8], domain: &str) -> bool {
        match build_udp_reply(&route.as_query_frame(), dns) {
            Ok(frame) => self.write(&frame, domain).await,
            Err(e) => {
                debug!(error = %e, domain = %domain, "Could not frame UDP reply");
                false
            }
        }
    }

    async fn write(&self, frame: &[u8], domain: &str) -> bool {
        match self.interface.write_frame(frame).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, domain = %domain, "Virtual interface write failed");
                false
            }
        }
    }

    fn log_for(&self, query: &ParsedQuery, protocol: QueryProtocol, received_at: Instant) -> QueryLog {
        let mut log = QueryLog::new(Arc::from(query.domain.as_str()), query.record_type, protocol);
        log.latency_us = received_at.elapsed().as_micros() as u64;
        log
    }
}

fn fill_from_response(log: &mut QueryLog, response: &[u8]) {
    if let Ok(parsed) = parse_response(response) {
        log.status = ResponseStatus::from_rcode(parsed.rcode);
        log.resolved_ips = resolved_addresses(&parsed);
    }
}
