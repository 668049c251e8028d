use std::fmt;

use serde::{Deserialize, Serialize};

/// A caller's subscription level.
///
/// Tiers are totally ordered: `Anonymous < Free < Dev < Pro < Team`.
/// The ordering is load-bearing: quota validation relies on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Anonymous,
    Free,
    Dev,
    Pro,
    Team,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 5] = [
        Tier::Anonymous,
        Tier::Free,
        Tier::Dev,
        Tier::Pro,
        Tier::Team,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Anonymous => "anonymous",
            Tier::Free => "free",
            Tier::Dev => "dev",
            Tier::Pro => "pro",
            Tier::Team => "team",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Anonymous
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
