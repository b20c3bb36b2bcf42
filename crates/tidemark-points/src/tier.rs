//! # Tier Classification
//!
//! Maps a token balance to one of five holder tiers.
//!
//! | Tier | Min Balance | Points/Hour | Weekly Cap |
//! |------|-------------|-------------|------------|
//! | 0 | - | 0 | 0 |
//! | 1 | 10 | 1 | 120 |
//! | 2 | 30 | 2 | 280 |
//! | 3 | 100 | 3 | 450 |
//! | 4 | 500 | 4 | 600 |

use serde::{Deserialize, Serialize};
use tidemark_core::{Balance, ONE_TOKEN};

/// Holder tier derived from balance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    /// Below 10 tokens, earns nothing
    #[default]
    Tier0,
    /// 10+ tokens
    Tier1,
    /// 30+ tokens
    Tier2,
    /// 100+ tokens
    Tier3,
    /// 500+ tokens
    Tier4,
}

impl Tier {
    /// All tiers in ascending order
    pub const ALL: [Tier; 5] = [Self::Tier0, Self::Tier1, Self::Tier2, Self::Tier3, Self::Tier4];

    /// Numeric tier 0-4
    pub fn index(&self) -> u8 {
        match self {
            Self::Tier0 => 0,
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
            Self::Tier4 => 4,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Inclusive lower bound in smallest units
    pub fn min_balance(&self) -> Balance {
        let whole_tokens: Balance = match self {
            Self::Tier0 => 0,
            Self::Tier1 => 10,
            Self::Tier2 => 30,
            Self::Tier3 => 100,
            Self::Tier4 => 500,
        };
        whole_tokens * ONE_TOKEN as Balance
    }

    /// Points earned per hour held
    pub fn points_per_hour(&self) -> u64 {
        u64::from(self.index())
    }

    /// Weekly cap for buckets opened at this tier
    pub fn weekly_cap(&self) -> u64 {
        match self {
            Self::Tier0 => 0,
            Self::Tier1 => 120,
            Self::Tier2 => 280,
            Self::Tier3 => 450,
            Self::Tier4 => 600,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tier0 => "tier0",
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Tier3 => "tier3",
            Self::Tier4 => "tier4",
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.index()
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or_else(|| format!("tier out of range: {value}"))
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a balance (smallest units) into a tier.
///
/// Total over all inputs; negative balances land in tier 0.
pub fn classify(balance: Balance) -> Tier {
    Tier::ALL
        .iter()
        .rev()
        .find(|tier| balance >= tier.min_balance())
        .copied()
        .unwrap_or(Tier::Tier0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokens(n: i128) -> Balance {
        n * ONE_TOKEN as Balance
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(classify(0), Tier::Tier0);
        assert_eq!(classify(tokens(10)), Tier::Tier1);
        assert_eq!(classify(tokens(30)), Tier::Tier2);
        assert_eq!(classify(tokens(100)), Tier::Tier3);
        assert_eq!(classify(tokens(500)), Tier::Tier4);
    }

    #[test]
    fn test_just_below_threshold() {
        // 9.999999 tokens
        assert_eq!(classify(9_999_999 * 1_000_000_000_000), Tier::Tier0);
        assert_eq!(classify(tokens(30) - 1), Tier::Tier1);
        assert_eq!(classify(tokens(500) - 1), Tier::Tier3);
    }

    #[test]
    fn test_negative_balance_is_tier0() {
        assert_eq!(classify(-tokens(1_000)), Tier::Tier0);
    }

    #[test]
    fn test_rate_table() {
        let rates: Vec<(u64, u64)> = Tier::ALL
            .iter()
            .map(|t| (t.points_per_hour(), t.weekly_cap()))
            .collect();
        assert_eq!(rates, vec![(0, 0), (1, 120), (2, 280), (3, 450), (4, 600)]);
    }

    #[test]
    fn test_index_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_index(tier.index()), Some(tier));
        }
        assert_eq!(Tier::from_index(5), None);
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Tier::Tier3).unwrap(), "3");
        let tier: Tier = serde_json::from_str("4").unwrap();
        assert_eq!(tier, Tier::Tier4);
        assert!(serde_json::from_str::<Tier>("7").is_err());
    }

    proptest! {
        #[test]
        fn classify_is_monotonic(a in -tokens(1_000)..tokens(2_000), b in -tokens(1_000)..tokens(2_000)) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(lo) <= classify(hi));
        }
    }
}
