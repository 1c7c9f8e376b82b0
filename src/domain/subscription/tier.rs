//! Module access tiers.
//!
//! Every feature module is tagged with the minimum tier a subscriber needs.
//! Tiers form a total order: Free < PRO < Premium.

use serde::{Deserialize, Serialize};

/// Minimum subscription tier required by a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleTier {
    /// Available to every user, including Freemium.
    #[serde(rename = "Free", alias = "free")]
    Free,

    /// Requires a PRO or Premium plan.
    #[serde(rename = "PRO", alias = "pro", alias = "Pro")]
    Pro,

    /// Requires a Premium plan.
    #[serde(rename = "Premium", alias = "premium")]
    Premium,
}

impl ModuleTier {
    /// Returns the numeric rank of this tier for comparison.
    ///
    /// Higher rank = more features.
    pub fn rank(&self) -> u8 {
        match self {
            ModuleTier::Free => 0,
            ModuleTier::Pro => 1,
            ModuleTier::Premium => 2,
        }
    }

    /// True if a subscriber holding `self` may use a module tagged `required`.
    pub fn covers(&self, required: ModuleTier) -> bool {
        self.rank() >= required.rank()
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleTier::Free => "Free",
            ModuleTier::Pro => "PRO",
            ModuleTier::Premium => "Premium",
        }
    }
}

impl PartialOrd for ModuleTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for ModuleTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
