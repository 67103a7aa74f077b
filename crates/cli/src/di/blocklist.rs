use dnstrap_application::ports::DomainFilterPort;
use dnstrap_application::use_cases::{BlocklistCommand, SyncBlocklistUseCase, UpdateBlocklistUseCase};
use dnstrap_domain::Config;
use dnstrap_infrastructure::dns::{BlocklistMatcher, ConfigBlocklistSource};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 256;

pub struct BlocklistServices {
    pub matcher: Arc<BlocklistMatcher>,
    /// Live edits from the rule store; the listener stops once every sender
    /// is gone.
    pub commands: mpsc::Sender<BlocklistCommand>,
}

impl BlocklistServices {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let matcher = Arc::new(BlocklistMatcher::new());
        let filter: Arc<dyn DomainFilterPort> = matcher.clone();

        let source = Arc::new(ConfigBlocklistSource::new(config.blocking.clone())?);
        match SyncBlocklistUseCase::new(source, filter.clone()).execute().await {
            Ok(total) => info!(rules = total, "Blocklist loaded"),
            // Start unfiltered rather than not at all.
            Err(e) => warn!(error = %e, "Blocklist sync failed, starting with an empty blocklist"),
        }

        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(UpdateBlocklistUseCase::new(filter).listen(rx));

        Self::watch_generations(&matcher);

        Ok(Self { matcher, commands })
    }

    fn watch_generations(matcher: &Arc<BlocklistMatcher>) {
        let mut generations = matcher.subscribe();
        let matcher = Arc::downgrade(matcher);
        tokio::spawn(async move {
            while generations.changed().await.is_ok() {
                let generation = *generations.borrow_and_update();
                let Some(matcher) = matcher.upgrade() else {
                    break;
                };
                debug!(
                    generation,
                    rules = matcher.rule_count(),
                    "Blocklist snapshot published"
                );
            }
        });
    }
}
