use dnstrap_domain::BlocklistRules;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEntry {
    Exact(String),
    Wildcard(String),
    Allow(String),
}

const HOSTS_ADDRESSES: [&str; 4] = ["0.0.0.0", "127.0.0.1", "::", "::1"];
const SYSTEM_NAMES: [&str; 5] = [
    "localhost",
    "0.0.0.0",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
];

/// Reads one line of a hosts file or plain domain list.
///
/// Accepted forms: `0.0.0.0 host`, `host`, `*.host`, `@@host`. Comments start
/// with `#` or `!`.
pub fn parse_list_line(line: &str) -> Option<ParsedEntry> {
    let line = line.split('#').next().unwrap_or("").trim();

    if line.is_empty() || line.starts_with('!') {
        return None;
    }

    if let Some(allowed) = line.strip_prefix("@@") {
        let domain = allowed.trim().trim_start_matches("||").trim_end_matches('^');
        return valid_name(domain).map(ParsedEntry::Allow);
    }

    if line.starts_with("*.") {
        return valid_name(&line[2..]).map(|suffix| ParsedEntry::Wildcard(format!("*.{}", suffix)));
    }

    let mut parts = line.split_whitespace();
    let first = parts.next()?;

    match parts.next() {
        Some(host) if HOSTS_ADDRESSES.contains(&first) => {
            if SYSTEM_NAMES.contains(&host) {
                return None;
            }
            valid_name(host).map(ParsedEntry::Exact)
        }
        Some(_) => None,
        None => valid_name(first).map(ParsedEntry::Exact),
    }
}

fn valid_name(domain: &str) -> Option<String> {
    let domain = domain.trim().trim_end_matches('.');
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return None;
    }
    if !domain
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
    {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}

pub fn parse_list_text(text: &str) -> BlocklistRules {
    let mut rules = BlocklistRules::new();
    for entry in text.lines().filter_map(parse_list_line) {
        match entry {
            ParsedEntry::Exact(d) => rules.blocked.push(d),
            ParsedEntry::Wildcard(w) => rules.wildcards.push(w),
            ParsedEntry::Allow(d) => rules.allowed.push(d),
        }
    }
    rules
}
