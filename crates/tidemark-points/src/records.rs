//! Mutable accounting records
//!
//! Every record is fetched from a [`PointsStore`](crate::store::PointsStore),
//! modified in place and written back. Missing records are default-constructed.

use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use tidemark_core::{Address, Balance};

/// Per-address holder state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account address
    pub id: Address,

    /// Current balance in smallest units (may be negative)
    pub balance: Balance,

    /// Tier derived from `balance`
    pub tier: Tier,

    /// Lifetime points earned
    pub total_points: u64,

    /// Timestamp of the last balance change
    pub last_updated: i64,

    /// Set the first time this address is credited; counted users make up
    /// the user total and the tier histogram
    pub counted: bool,
}

impl User {
    pub fn new(id: Address, timestamp: i64) -> Self {
        Self {
            id,
            balance: 0,
            tier: Tier::Tier0,
            total_points: 0,
            last_updated: timestamp,
            counted: false,
        }
    }
}

/// Points earned by one user in one week
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPoints {
    /// Account address
    pub user: Address,

    /// Sunday 00:00 UTC of the week
    pub week: i64,

    /// Points earned so far this week
    pub points_earned: u64,

    /// Cap fixed from the tier active when the bucket was opened
    pub weekly_cap: u64,

    /// `points_earned >= weekly_cap`
    pub is_cap_reached: bool,
}

/// Write-once record of one hour's accrual for one user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySnapshot {
    /// Account address
    pub user: Address,

    /// Top of the UTC hour
    pub hour: i64,

    /// Week the hour falls into
    pub week: i64,

    /// Points awarded for this hour (0 when the weekly cap was hit)
    pub points_awarded: u64,

    /// Tier at accrual time
    pub tier: Tier,

    /// Balance at accrual time
    pub balance: Balance,
}

/// Count of counted users per tier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierHistogram {
    pub tier0: u64,
    pub tier1: u64,
    pub tier2: u64,
    pub tier3: u64,
    pub tier4: u64,
}

impl TierHistogram {
    pub fn get(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Tier0 => self.tier0,
            Tier::Tier1 => self.tier1,
            Tier::Tier2 => self.tier2,
            Tier::Tier3 => self.tier3,
            Tier::Tier4 => self.tier4,
        }
    }

    fn slot(&mut self, tier: Tier) -> &mut u64 {
        match tier {
            Tier::Tier0 => &mut self.tier0,
            Tier::Tier1 => &mut self.tier1,
            Tier::Tier2 => &mut self.tier2,
            Tier::Tier3 => &mut self.tier3,
            Tier::Tier4 => &mut self.tier4,
        }
    }

    pub fn increment(&mut self, tier: Tier) {
        *self.slot(tier) += 1;
    }

    /// Decrement, flooring at zero. Returns false on underflow.
    pub fn decrement(&mut self, tier: Tier) -> bool {
        let slot = self.slot(tier);
        match slot.checked_sub(1) {
            Some(v) => {
                *slot = v;
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> u64 {
        self.tier0 + self.tier1 + self.tier2 + self.tier3 + self.tier4
    }

    /// JSON form for stores that keep the histogram as a text column
    pub fn to_json(&self) -> tidemark_core::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| tidemark_core::TidemarkError::Serialization(e.to_string()))
    }

    pub fn from_json(s: &str) -> tidemark_core::Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| tidemark_core::TidemarkError::Serialization(e.to_string()))
    }
}

/// Singleton aggregate counters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Distinct addresses ever credited
    pub total_users: u64,

    /// Points awarded across all users
    pub total_points: u64,

    /// Latest week seen by accrual
    pub current_week: i64,

    /// Latest hour seen by accrual
    pub last_snapshot_hour: i64,

    /// Counted users per tier
    pub tier_histogram: TierHistogram,
}
