use dnstrap_domain::BlocklistRules;

/// Blocklist decision and live rule edits.
///
/// Lookups must stay wait-free with respect to writers: implementations
/// publish immutable snapshots.
pub trait DomainFilterPort: Send + Sync {
    fn is_blocked(&self, domain: &str) -> bool;
    fn add_domain(&self, domain: &str);
    /// Accepts `*.suffix` or the bare suffix.
    fn add_wildcard(&self, pattern: &str);
    fn remove_domain(&self, domain: &str) -> bool;
    fn allow_domain(&self, domain: &str);
    fn disallow_domain(&self, domain: &str) -> bool;
    /// Replaces every block rule at once. Allow entries are kept.
    fn bulk_update(&self, domains: Vec<String>, wildcards: Vec<String>);
    /// Replaces every block rule and the previously synced allow entries in
    /// one publish. Allow entries added at runtime are kept.
    fn replace_rules(&self, rules: BlocklistRules);
    fn rule_count(&self) -> usize;
}
