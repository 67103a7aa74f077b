use crate::dns::codec::{ParsedResponse, RecordData};
use dnstrap_application::ports::DomainFilterPort;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Alias hops followed per answer. Later CNAMEs are ignored.
pub const MAX_CNAME_HOPS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloakVerdict {
    /// CNAME targets in resolution order, at most [`MAX_CNAME_HOPS`].
    pub chain: Vec<String>,
    /// First target in the chain that is blocklisted.
    pub blocked_target: Option<String>,
}

impl CloakVerdict {
    pub fn is_cloaked(&self) -> bool {
        self.blocked_target.is_some()
    }
}

/// Checks the alias chain of an allowed answer against the blocklist.
pub struct CnameCloakDetector {
    filter: Arc<dyn DomainFilterPort>,
}

impl CnameCloakDetector {
    pub fn new(filter: Arc<dyn DomainFilterPort>) -> Self {
        Self { filter }
    }

    pub fn inspect(&self, response: &ParsedResponse) -> CloakVerdict {
        let chain = alias_chain(response);
        let blocked_target = chain.iter().find(|t| self.filter.is_blocked(t)).cloned();

        if let Some(target) = &blocked_target {
            debug!(
                question = response.question.as_deref().unwrap_or(""),
                target = %target,
                hops = chain.len(),
                "CNAME cloak detected"
            );
        }

        CloakVerdict {
            chain,
            blocked_target,
        }
    }
}

/// Follows CNAMEs from the question name. Records that do not link into
/// the chain are appended in answer order.
pub fn alias_chain(response: &ParsedResponse) -> Vec<String> {
    let cnames: Vec<(&str, &str)> = response
        .answers
        .iter()
        .filter_map(|r| match &r.data {
            RecordData::Cname(target) => Some((r.name.as_str(), target.as_str())),
            _ => None,
        })
        .collect();

    let mut used = vec![false; cnames.len()];
    let mut chain = Vec::with_capacity(cnames.len().min(MAX_CNAME_HOPS));

    if let Some(mut current) = response.question.as_deref() {
        while chain.len() < MAX_CNAME_HOPS {
            let next = cnames
                .iter()
                .enumerate()
                .find(|(i, (owner, _))| !used[*i] && owner.eq_ignore_ascii_case(current));
            let Some((i, (_, target))) = next else {
                break;
            };
            used[i] = true;
            chain.push(target.to_string());
            current = *target;
        }
    }

    for (i, (_, target)) in cnames.iter().enumerate() {
        if chain.len() >= MAX_CNAME_HOPS {
            break;
        }
        if !used[i] {
            chain.push(target.to_string());
        }
    }

    chain
}

/// A and AAAA addresses in the answer section.
pub fn resolved_addresses(response: &ParsedResponse) -> Vec<IpAddr> {
    response
        .answers
        .iter()
        .filter_map(|r| match r.data {
            RecordData::A(v4) => Some(IpAddr::V4(v4)),
            RecordData::Aaaa(v6) => Some(IpAddr::V6(v6)),
            _ => None,
        })
        .collect()
}
