use dnstrap_application::ports::DnsCachePort;
use dnstrap_application::use_cases::GetCacheStatsUseCase;
use dnstrap_infrastructure::dns::{EngineStats, ResponseCache};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const REPORT_INTERVAL: Duration = Duration::from_secs(60);

pub fn spawn_stats_reporter(
    engine: Arc<EngineStats>,
    cache: Arc<ResponseCache>,
    shutdown: CancellationToken,
) {
    let cache_stats = GetCacheStatsUseCase::new(cache as Arc<dyn DnsCachePort>);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REPORT_INTERVAL);
        // First tick fires immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let queries = engine.snapshot();
                    let cache = cache_stats.execute();
                    info!(
                        queries = queries.queries_total,
                        blocked = queries.queries_blocked,
                        cname_cloaks = queries.cname_cloaks,
                        upstream_failures = queries.upstream_failures,
                        malformed = queries.malformed_frames,
                        throttled = queries.queries_throttled,
                        cache_entries = cache.total_entries(),
                        cache_hits = cache.hits,
                        cache_misses = cache.misses,
                        cache_evictions = cache.evictions,
                        hit_rate = format!("{:.1}%", cache.hit_rate * 100.0),
                        "Engine stats"
                    );
                }
            }
        }
    });
}
