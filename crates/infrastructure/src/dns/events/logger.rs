use super::{EngineEvent, EngineWarning};
use dnstrap_domain::QueryLog;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const DRAIN_BATCH: usize = 100;

/// Consumes engine events and writes them to the structured log stream.
///
/// The engine only ever pushes into an unbounded channel, so a slow log
/// sink never stalls the interception loop.
#[derive(Debug, Default)]
pub struct EngineEventLogger {
    log_allowed: bool,
}

impl EngineEventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emit allowed queries at `info` (they go to `debug` otherwise).
    pub fn with_allowed_queries(mut self, enabled: bool) -> Self {
        self.log_allowed = enabled;
        self
    }

    pub fn start(self, mut rx: mpsc::UnboundedReceiver<EngineEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            debug!("Engine event logger started");
            let mut batch = Vec::with_capacity(DRAIN_BATCH);
            let mut total_events = 0u64;

            while let Some(event) = rx.recv().await {
                batch.push(event);
                while batch.len() < DRAIN_BATCH {
                    match rx.try_recv() {
                        Ok(event) => batch.push(event),
                        Err(_) => break,
                    }
                }

                total_events += batch.len() as u64;
                for event in batch.drain(..) {
                    self.log(&event);
                }
            }

            debug!(total_events, "Engine event logger shutting down");
        })
    }

    pub fn log(&self, event: &EngineEvent) {
        match event {
            EngineEvent::Query(log) => self.log_query(log),
            EngineEvent::Warning(warning) => log_warning(warning),
        }
    }

    fn log_query(&self, log: &QueryLog) {
        let reason = log.block_reason.map(|r| format!("{:?}", r));
        let upstream = log.upstream.as_deref().unwrap_or("-");
        if log.blocked {
            info!(
                domain = %log.hostname,
                qtype = %log.record_type,
                reason = reason.as_deref().unwrap_or("-"),
                status = log.status.as_str(),
                protocol = ?log.protocol,
                cname_chain = ?log.cname_chain,
                latency_us = log.latency_us,
                "Query blocked"
            );
        } else if self.log_allowed {
            info!(
                domain = %log.hostname,
                qtype = %log.record_type,
                status = log.status.as_str(),
                upstream,
                cache_hit = log.cache_hit,
                resolved = ?log.resolved_ips,
                latency_us = log.latency_us,
                "Query answered"
            );
        } else {
            debug!(
                domain = %log.hostname,
                qtype = %log.record_type,
                status = log.status.as_str(),
                upstream,
                cache_hit = log.cache_hit,
                latency_us = log.latency_us,
                "Query answered"
            );
        }
    }
}

fn log_warning(warning: &EngineWarning) {
    match warning {
        EngineWarning::UnpinnedFallback {
            provider,
            succeeded,
        } => warn!(
            provider = %provider,
            succeeded,
            "Certificate pinning bypassed: query sent to fallback resolver with CA validation only"
        ),
        EngineWarning::InFlightLimit { limit } => {
            warn!(limit, "Allowed query dropped at the in-flight forward limit")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::events::EngineEventEmitter;
    use dnstrap_domain::{QueryProtocol, RecordType};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_logger_drains_until_senders_drop() {
        let (emitter, rx) = EngineEventEmitter::new_enabled();
        let handle = EngineEventLogger::new().start(rx);

        emitter.query(QueryLog::new(Arc::from("example.com"), RecordType::A, QueryProtocol::Udp));
        emitter.warning(EngineWarning::InFlightLimit { limit: 4 });
        drop(emitter);

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
