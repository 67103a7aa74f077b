use super::suffix_trie::{normalize_domain, SuffixTrie, Verdict};
use arc_swap::ArcSwap;
use compact_str::CompactString;
use dnstrap_application::ports::DomainFilterPort;
use dnstrap_domain::BlocklistRules;
use rustc_hash::FxHashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info};

/// Blocklist Matcher.
///
/// Readers load the current [`SuffixTrie`] snapshot without locking. Writers
/// are serialized by `writer`, build the next snapshot from a copy of the
/// current one and publish it with a single pointer swap. Every publish bumps
/// the generation seen by [`BlocklistMatcher::subscribe`].
pub struct BlocklistMatcher {
    snapshot: ArcSwap<SuffixTrie>,
    writer: Mutex<AllowEntries>,
    generation: watch::Sender<u64>,
}

/// Allow entries re-applied on every rebuild. `live` comes from runtime
/// commands, `synced` from the last rule store sync and is replaced whole.
#[derive(Default)]
struct AllowEntries {
    live: FxHashSet<CompactString>,
    synced: FxHashSet<CompactString>,
}

impl AllowEntries {
    fn iter(&self) -> impl Iterator<Item = &CompactString> {
        self.live.iter().chain(self.synced.difference(&self.live))
    }
}

impl BlocklistMatcher {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            snapshot: ArcSwap::from_pointee(SuffixTrie::new()),
            writer: Mutex::new(AllowEntries::default()),
            generation,
        }
    }

    pub fn from_rules(rules: &BlocklistRules) -> Self {
        let matcher = Self::new();
        matcher.replace_rules(rules.clone());
        matcher
    }

    #[inline]
    pub fn lookup(&self, domain: &str) -> Verdict {
        self.snapshot.load().lookup(domain)
    }

    pub fn snapshot(&self) -> Arc<SuffixTrie> {
        self.snapshot.load_full()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Receiver that changes whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    fn lock_writer(&self) -> MutexGuard<'_, AllowEntries> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish<R>(&self, edit: impl FnOnce(&mut SuffixTrie, &mut AllowEntries) -> R) -> R {
        let mut allowed = self.lock_writer();
        let mut next = SuffixTrie::clone(&self.snapshot.load());
        let result = edit(&mut next, &mut allowed);
        self.snapshot.store(Arc::new(next));
        self.generation.send_modify(|g| *g += 1);
        result
    }

    /// Builds a fresh trie from `allowed` plus the given block rules and
    /// publishes it. Caller holds the writer lock.
    fn rebuild(&self, allowed: &AllowEntries, domains: &[String], wildcards: &[String]) {
        let mut next = SuffixTrie::new();
        for name in allowed.iter() {
            next.insert_allow(name);
        }
        for domain in domains {
            next.insert_exact(domain);
        }
        for pattern in wildcards {
            next.insert_wildcard(pattern);
        }

        info!(
            exact = next.blocked_count(),
            wildcards = next.wildcard_count(),
            allowed = next.allowed_count(),
            "Blocklist snapshot published"
        );
        self.snapshot.store(Arc::new(next));
        self.generation.send_modify(|g| *g += 1);
        debug!(generation = *self.generation.borrow(), "Blocklist generation bumped");
    }
}

impl Default for BlocklistMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainFilterPort for BlocklistMatcher {
    #[inline]
    fn is_blocked(&self, domain: &str) -> bool {
        self.lookup(domain).is_blocked()
    }

    fn add_domain(&self, domain: &str) {
        self.publish(|trie, _| trie.insert_exact(domain));
    }

    fn add_wildcard(&self, pattern: &str) {
        self.publish(|trie, _| trie.insert_wildcard(pattern));
    }

    /// Drops the exact rule and any wildcard rooted at `domain`.
    fn remove_domain(&self, domain: &str) -> bool {
        self.publish(|trie, _| trie.remove_exact(domain) | trie.remove_wildcard(domain))
    }

    fn allow_domain(&self, domain: &str) {
        let Some(name) = normalize_domain(domain) else {
            return;
        };
        self.publish(|trie, allowed| {
            trie.insert_allow(&name);
            allowed.live.insert(name);
        });
    }

    fn disallow_domain(&self, domain: &str) -> bool {
        let Some(name) = normalize_domain(domain) else {
            return false;
        };
        self.publish(|trie, allowed| {
            allowed.live.remove(&name);
            allowed.synced.remove(&name);
            trie.remove_allow(&name)
        })
    }

    fn bulk_update(&self, domains: Vec<String>, wildcards: Vec<String>) {
        let allowed = self.lock_writer();
        self.rebuild(&allowed, &domains, &wildcards);
    }

    fn replace_rules(&self, rules: BlocklistRules) {
        let mut allowed = self.lock_writer();
        allowed.synced = rules
            .allowed
            .iter()
            .filter_map(|domain| normalize_domain(domain))
            .collect();
        self.rebuild(&allowed, &rules.blocked, &rules.wildcards);
    }

    fn rule_count(&self) -> usize {
        self.snapshot.load().len()
    }
}
