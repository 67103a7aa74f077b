use async_trait::async_trait;
use dnstrap_application::ports::{
    BlocklistSourcePort, CacheMetricsSnapshot, DnsCachePort, DomainFilterPort, FirewallPort,
};
use dnstrap_domain::{BlocklistRules, DomainError, FirewallRuleset};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FilterState {
    blocked: HashSet<String>,
    wildcards: HashSet<String>,
    allowed: HashSet<String>,
    synced_allowed: HashSet<String>,
    bulk_updates: usize,
}

#[derive(Clone, Default)]
pub struct MockDomainFilter {
    state: Arc<Mutex<FilterState>>,
}

impl MockDomainFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocked(&self) -> HashSet<String> {
        self.state.lock().unwrap().blocked.clone()
    }

    pub fn wildcards(&self) -> HashSet<String> {
        self.state.lock().unwrap().wildcards.clone()
    }

    pub fn allowed(&self) -> HashSet<String> {
        let state = self.state.lock().unwrap();
        state.allowed.union(&state.synced_allowed).cloned().collect()
    }

    pub fn bulk_updates(&self) -> usize {
        self.state.lock().unwrap().bulk_updates
    }
}

impl DomainFilterPort for MockDomainFilter {
    fn is_blocked(&self, domain: &str) -> bool {
        let state = self.state.lock().unwrap();
        !state.allowed.contains(domain)
            && !state.synced_allowed.contains(domain)
            && state.blocked.contains(domain)
    }

    fn add_domain(&self, domain: &str) {
        self.state.lock().unwrap().blocked.insert(domain.to_string());
    }

    fn add_wildcard(&self, pattern: &str) {
        self.state.lock().unwrap().wildcards.insert(pattern.to_string());
    }

    fn remove_domain(&self, domain: &str) -> bool {
        self.state.lock().unwrap().blocked.remove(domain)
    }

    fn allow_domain(&self, domain: &str) {
        self.state.lock().unwrap().allowed.insert(domain.to_string());
    }

    fn disallow_domain(&self, domain: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        state.allowed.remove(domain) | state.synced_allowed.remove(domain)
    }

    fn bulk_update(&self, domains: Vec<String>, wildcards: Vec<String>) {
        let mut state = self.state.lock().unwrap();
        state.blocked = domains.into_iter().collect();
        state.wildcards = wildcards.into_iter().collect();
        state.bulk_updates += 1;
    }

    fn replace_rules(&self, rules: BlocklistRules) {
        let mut state = self.state.lock().unwrap();
        state.blocked = rules.blocked.into_iter().collect();
        state.wildcards = rules.wildcards.into_iter().collect();
        state.synced_allowed = rules.allowed.into_iter().collect();
        state.bulk_updates += 1;
    }

    fn rule_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.blocked.len() + state.wildcards.len() + state.allowed.union(&state.synced_allowed).count()
    }
}

pub struct MockBlocklistSource {
    rules: Mutex<Result<BlocklistRules, DomainError>>,
}

impl MockBlocklistSource {
    pub fn with_rules(rules: BlocklistRules) -> Self {
        Self {
            rules: Mutex::new(Ok(rules)),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            rules: Mutex::new(Err(error)),
        }
    }

    pub fn set_rules(&self, rules: BlocklistRules) {
        *self.rules.lock().unwrap() = Ok(rules);
    }
}

#[async_trait]
impl BlocklistSourcePort for MockBlocklistSource {
    async fn fetch_rules(&self) -> Result<BlocklistRules, DomainError> {
        self.rules.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct MockFirewall {
    applied: Mutex<Vec<FirewallRuleset>>,
    reject: Mutex<Option<String>>,
}

impl MockFirewall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            applied: Mutex::new(vec![]),
            reject: Mutex::new(Some(reason.to_string())),
        }
    }

    pub fn applied(&self) -> Vec<FirewallRuleset> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl FirewallPort for MockFirewall {
    async fn apply_rules(&self, ruleset: &FirewallRuleset) -> Result<(), DomainError> {
        if let Some(reason) = self.reject.lock().unwrap().clone() {
            return Err(DomainError::FirewallRejected(reason));
        }
        self.applied.lock().unwrap().push(ruleset.clone());
        Ok(())
    }
}

pub struct MockDnsCache {
    snapshot: CacheMetricsSnapshot,
}

impl MockDnsCache {
    pub fn new(snapshot: CacheMetricsSnapshot) -> Self {
        Self { snapshot }
    }
}

impl DnsCachePort for MockDnsCache {
    fn cache_size(&self) -> usize {
        self.snapshot.total_entries()
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.snapshot.clone()
    }

    fn clear(&self) {}
}
