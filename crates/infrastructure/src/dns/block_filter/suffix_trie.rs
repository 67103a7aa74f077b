use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// One node per label. Children are shared between snapshots; a writer only
/// copies the nodes on the path it touches.
#[derive(Clone, Default)]
struct TrieNode {
    children: HashMap<CompactString, Arc<TrieNode>, FxBuildHasher>,
    exact_blocked: bool,
    exact_allowed: bool,
    wildcard_blocked: bool,
}

impl TrieNode {
    fn is_empty(&self) -> bool {
        self.children.is_empty()
            && !self.exact_blocked
            && !self.exact_allowed
            && !self.wildcard_blocked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Blocked,
    Allowed,
    Wildcard,
}

impl Flag {
    fn is_set(self, node: &TrieNode) -> bool {
        match self {
            Flag::Blocked => node.exact_blocked,
            Flag::Allowed => node.exact_allowed,
            Flag::Wildcard => node.wildcard_blocked,
        }
    }

    fn slot(self, node: &mut TrieNode) -> &mut bool {
        match self {
            Flag::Blocked => &mut node.exact_blocked,
            Flag::Allowed => &mut node.exact_allowed,
            Flag::Wildcard => &mut node.wildcard_blocked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Exact allow entry; wins over any block.
    Allowed,
    BlockedExact,
    BlockedWildcard,
    NotListed,
}

impl Verdict {
    pub fn is_blocked(self) -> bool {
        matches!(self, Verdict::BlockedExact | Verdict::BlockedWildcard)
    }
}

/// Lowercases, strips surrounding whitespace and trailing dots.
/// `None` for names that cannot be rules (empty, inner empty labels).
pub fn normalize_domain(domain: &str) -> Option<CompactString> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() || trimmed.split('.').any(str::is_empty) {
        return None;
    }
    Some(CompactString::new(trimmed.to_ascii_lowercase()))
}

/// Reversed-label trie: `com` -> `example` -> `ads`.
#[derive(Clone, Default)]
pub struct SuffixTrie {
    root: Arc<TrieNode>,
    blocked: usize,
    allowed: usize,
    wildcards: usize,
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_exact(&mut self, domain: &str) -> bool {
        let inserted = self.set(domain, Flag::Blocked);
        self.blocked += inserted as usize;
        inserted
    }

    pub fn insert_allow(&mut self, domain: &str) -> bool {
        let inserted = self.set(domain, Flag::Allowed);
        self.allowed += inserted as usize;
        inserted
    }

    /// `*.ads.example.com` and `ads.example.com` both mark the
    /// `ads.example.com` node; the node itself stays unblocked.
    pub fn insert_wildcard(&mut self, pattern: &str) -> bool {
        let suffix = pattern.trim().strip_prefix("*.").unwrap_or(pattern);
        let inserted = self.set(suffix, Flag::Wildcard);
        self.wildcards += inserted as usize;
        inserted
    }

    pub fn remove_exact(&mut self, domain: &str) -> bool {
        let removed = self.clear(domain, Flag::Blocked);
        self.blocked -= removed as usize;
        removed
    }

    pub fn remove_allow(&mut self, domain: &str) -> bool {
        let removed = self.clear(domain, Flag::Allowed);
        self.allowed -= removed as usize;
        removed
    }

    pub fn remove_wildcard(&mut self, pattern: &str) -> bool {
        let suffix = pattern.trim().strip_prefix("*.").unwrap_or(pattern);
        let removed = self.clear(suffix, Flag::Wildcard);
        self.wildcards -= removed as usize;
        removed
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed
    }

    pub fn wildcard_count(&self) -> usize {
        self.wildcards
    }

    pub fn len(&self) -> usize {
        self.blocked + self.allowed + self.wildcards
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookup(&self, domain: &str) -> Verdict {
        let Some(domain) = normalize_domain(domain) else {
            return Verdict::NotListed;
        };
        let labels: SmallVec<[&str; 8]> = domain.split('.').rev().collect();
        let n = labels.len();
        let mut node = &self.root;
        let mut wildcard_hit = false;

        for (i, label) in labels.iter().enumerate() {
            match node.children.get(*label) {
                Some(child) => {
                    if child.wildcard_blocked && i + 1 < n {
                        wildcard_hit = true;
                    }
                    node = child;
                }
                None => {
                    return if wildcard_hit {
                        Verdict::BlockedWildcard
                    } else {
                        Verdict::NotListed
                    };
                }
            }
        }

        if node.exact_allowed {
            Verdict::Allowed
        } else if node.exact_blocked {
            Verdict::BlockedExact
        } else if wildcard_hit {
            Verdict::BlockedWildcard
        } else {
            Verdict::NotListed
        }
    }

    pub fn is_blocked(&self, domain: &str) -> bool {
        self.lookup(domain).is_blocked()
    }

    fn set(&mut self, domain: &str, flag: Flag) -> bool {
        let Some(domain) = normalize_domain(domain) else {
            return false;
        };
        let mut node = Arc::make_mut(&mut self.root);
        for label in domain.split('.').rev() {
            let child = node
                .children
                .entry(CompactString::new(label))
                .or_default();
            node = Arc::make_mut(child);
        }
        let slot = flag.slot(node);
        let was_set = *slot;
        *slot = true;
        !was_set
    }

    fn clear(&mut self, domain: &str, flag: Flag) -> bool {
        let Some(domain) = normalize_domain(domain) else {
            return false;
        };
        let labels: SmallVec<[&str; 8]> = domain.split('.').rev().collect();
        clear_path(&mut self.root, &labels, flag)
    }
}

/// Clears `flag` at the end of `labels` and prunes nodes left empty.
/// Nodes are only copied once the path is known to exist.
fn clear_path(node: &mut Arc<TrieNode>, labels: &[&str], flag: Flag) -> bool {
    let Some((label, rest)) = labels.split_first() else {
        if !flag.is_set(node) {
            return false;
        }
        *flag.slot(Arc::make_mut(node)) = false;
        return true;
    };

    if !node.children.contains_key(*label) {
        return false;
    }
    let node = Arc::make_mut(node);
    let Some(child) = node.children.get_mut(*label) else {
        return false;
    };
    let removed = clear_path(child, rest, flag);
    if removed && child.is_empty() {
        node.children.remove(*label);
    }
    removed
}
