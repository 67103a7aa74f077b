/// Rule content handed over by the rule store: exact names, wildcard
/// patterns (`*.suffix`) and user allow entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlocklistRules {
    pub blocked: Vec<String>,
    pub wildcards: Vec<String>,
    pub allowed: Vec<String>,
}

impl BlocklistRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, other: BlocklistRules) {
        self.blocked.extend(other.blocked);
        self.wildcards.extend(other.wildcards);
        self.allowed.extend(other.allowed);
    }

    pub fn len(&self) -> usize {
        self.blocked.len() + self.wildcards.len() + self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
