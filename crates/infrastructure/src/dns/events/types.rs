use dnstrap_domain::QueryLog;
use std::fmt;
use std::sync::Arc;

/// Degraded-path notices that must reach the observability sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineWarning {
    /// Every pinned provider failed and a CA-only request was attempted.
    UnpinnedFallback { provider: Arc<str>, succeeded: bool },
    /// An allowed query was dropped because too many forwards were pending.
    InFlightLimit { limit: usize },
}

impl fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineWarning::UnpinnedFallback {
                provider,
                succeeded,
            } => write!(
                f,
                "unpinned fallback to {} ({})",
                provider,
                if *succeeded { "succeeded" } else { "failed" }
            ),
            EngineWarning::InFlightLimit { limit } => {
                write!(f, "in-flight forward limit {} reached", limit)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Query(QueryLog),
    Warning(EngineWarning),
}

impl EngineEvent {
    pub fn as_query(&self) -> Option<&QueryLog> {
        match self {
            EngineEvent::Query(log) => Some(log),
            EngineEvent::Warning(_) => None,
        }
    }

    pub fn as_warning(&self) -> Option<&EngineWarning> {
        match self {
            EngineEvent::Warning(w) => Some(w),
            EngineEvent::Query(_) => None,
        }
    }
}
