use super::rules::parse_list_text;
use async_trait::async_trait;
use dnstrap_application::ports::BlocklistSourcePort;
use dnstrap_domain::config::BlockingConfig;
use dnstrap_domain::{BlocklistRules, DomainError};
use futures::future::join_all;
use std::time::Duration;
use tracing::{info, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Rule store backed by the `[blocking]` config section: local list files,
/// `http(s)://` list URLs and the inline custom entries.
pub struct ConfigBlocklistSource {
    config: BlockingConfig,
    http_client: reqwest::Client,
}

impl ConfigBlocklistSource {
    pub fn new(config: BlockingConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("dnstrap/", env!("CARGO_PKG_VERSION"), " (blocklist-sync)"))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| DomainError::IoError(e.to_string()))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn custom_rules(&self) -> BlocklistRules {
        BlocklistRules {
            blocked: self.config.custom_blocked.clone(),
            wildcards: self.config.custom_wildcards.clone(),
            allowed: self.config.allowlist.clone(),
        }
    }
}

async fn fetch_url(url: &str, client: &reqwest::Client) -> Result<String, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error for {}: {}", url, e))?;

    if !response.status().is_success() {
        return Err(format!("HTTP {} for {}", response.status().as_u16(), url));
    }

    response
        .text()
        .await
        .map_err(|e| format!("read error for {}: {}", url, e))
}

async fn load_source(location: &str, client: &reqwest::Client) -> Result<String, String> {
    if location.starts_with("http://") || location.starts_with("https://") {
        fetch_url(location, client).await
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|e| format!("read error for {}: {}", location, e))
    }
}

#[async_trait]
impl BlocklistSourcePort for ConfigBlocklistSource {
    async fn fetch_rules(&self) -> Result<BlocklistRules, DomainError> {
        let loads = self
            .config
            .blocklist_files
            .iter()
            .map(|location| async move {
                (location, load_source(location, &self.http_client).await)
            });

        let mut rules = BlocklistRules::new();
        let mut failed = 0usize;
        for (location, result) in join_all(loads).await {
            match result {
                Ok(text) => {
                    let parsed = parse_list_text(&text);
                    info!(source = %location, rules = parsed.len(), "Loaded blocklist source");
                    rules.extend(parsed);
                }
                Err(e) => {
                    failed += 1;
                    warn!(source = %location, error = %e, "Failed to load blocklist source");
                }
            }
        }

        if failed > 0 && failed == self.config.blocklist_files.len() {
            return Err(DomainError::IoError(format!(
                "all {} blocklist sources failed to load",
                failed
            )));
        }

        rules.extend(self.custom_rules());
        Ok(rules)
    }
}
