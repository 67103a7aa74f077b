use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How a blocked query is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockPolicy {
    #[default]
    Nxdomain,
    ZeroIp,
    Refused,
}

impl BlockPolicy {
    /// Resolves the policy name handed over by the configuration collaborator.
    /// Anything unrecognised falls back to NXDOMAIN.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "zero_ip" => BlockPolicy::ZeroIp,
            "refused" => BlockPolicy::Refused,
            _ => BlockPolicy::Nxdomain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockPolicy::Nxdomain => "nxdomain",
            BlockPolicy::ZeroIp => "zero_ip",
            BlockPolicy::Refused => "refused",
        }
    }
}

impl fmt::Display for BlockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BlockPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(BlockPolicy::from_name(&name))
    }
}
