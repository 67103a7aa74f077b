use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BlockingConfig {
    /// Hosts-format or plain domain lists loaded at startup.
    #[serde(default)]
    pub blocklist_files: Vec<String>,

    #[serde(default)]
    pub custom_blocked: Vec<String>,

    /// Patterns such as `*.ads.example.com`.
    #[serde(default)]
    pub custom_wildcards: Vec<String>,

    /// Exact names that are never blocked, whatever the lists say.
    #[serde(default)]
    pub allowlist: Vec<String>,
}
