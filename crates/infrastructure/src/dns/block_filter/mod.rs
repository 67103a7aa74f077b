mod engine;
mod rules;
mod source;
mod suffix_trie;

pub use engine::BlocklistMatcher;
pub use rules::{parse_list_line, parse_list_text, ParsedEntry};
pub use source::ConfigBlocklistSource;
pub use suffix_trie::{normalize_domain, SuffixTrie, Verdict};
