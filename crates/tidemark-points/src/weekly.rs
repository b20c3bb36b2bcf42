//! # Weekly Bucket Keeper
//!
//! One bucket per (user, week). The cap is taken from the tier active when
//! the bucket is first opened and stays fixed for the rest of the week, even
//! if the holder moves tiers.

use crate::engine::PointsEngine;
use crate::records::WeeklyPoints;
use crate::store::PointsStore;
use crate::tier::Tier;
use tidemark_core::{Address, Result};

impl WeeklyPoints {
    /// Open an empty bucket with the cap of `tier`
    pub fn open(user: Address, week: i64, tier: Tier) -> Self {
        Self {
            user,
            week,
            points_earned: 0,
            weekly_cap: tier.weekly_cap(),
            is_cap_reached: false,
        }
    }

    /// Points still available this week
    pub fn remaining(&self) -> u64 {
        self.weekly_cap.saturating_sub(self.points_earned)
    }

    /// Award up to `offered` points, clamped to what the cap leaves.
    /// Returns the points actually awarded.
    pub fn award(&mut self, offered: u64) -> u64 {
        let awarded = offered.min(self.remaining());
        self.points_earned += awarded;
        self.is_cap_reached = self.points_earned >= self.weekly_cap;
        awarded
    }
}

impl<S: PointsStore> PointsEngine<S> {
    /// Fetch the bucket for (user, week), opening it at `tier` if missing
    pub(crate) fn week_bucket(&self, user: &Address, week: i64, tier: Tier) -> Result<WeeklyPoints> {
        match self.store().weekly(user, week)? {
            Some(bucket) => Ok(bucket),
            None => {
                tracing::debug!(
                    user = %user,
                    week,
                    cap = tier.weekly_cap(),
                    "opening weekly bucket"
                );
                Ok(WeeklyPoints::open(*user, week, tier))
            }
        }
    }
}
