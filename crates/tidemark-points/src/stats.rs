//! # Aggregate Stats Tracker
//!
//! Global counters: distinct users, points distributed, latest buckets seen,
//! and the tier histogram. The histogram always partitions the counted users.

use crate::engine::PointsEngine;
use crate::records::{GlobalStats, User};
use crate::store::PointsStore;
use crate::tier::Tier;
use tidemark_core::Result;

impl GlobalStats {
    /// Count a newly credited user at `tier`
    pub fn register_user(&mut self, tier: Tier) {
        self.total_users += 1;
        self.tier_histogram.increment(tier);
    }

    /// Move one user between histogram slots. Returns false if the source
    /// slot was already empty (the decrement was floored).
    pub fn move_tier(&mut self, from: Tier, to: Tier) -> bool {
        let decremented = self.tier_histogram.decrement(from);
        self.tier_histogram.increment(to);
        decremented
    }

    /// Add awarded points and advance the latest hour/week markers
    pub fn record_award(&mut self, points: u64, hour: i64, week: i64) {
        self.total_points += points;
        self.current_week = self.current_week.max(week);
        self.last_snapshot_hour = self.last_snapshot_hour.max(hour);
    }
}

impl<S: PointsStore> PointsEngine<S> {
    /// Load the stats singleton, default-constructing it on first use
    pub fn global_stats(&self) -> Result<GlobalStats> {
        Ok(self.store().stats()?.unwrap_or_default())
    }

    /// Count `user` the first time it is credited. No-op afterwards.
    ///
    /// Runs before the credit's tier update so the user enters the
    /// histogram at its pre-credit tier and is then moved like any other.
    pub fn register_credited(&self, user: &mut User) -> Result<bool> {
        if user.counted {
            return Ok(false);
        }

        user.counted = true;
        let mut stats = self.global_stats()?;
        stats.register_user(user.tier);
        self.store().put_stats(stats)?;
        self.store().put_user(user.clone())?;

        tracing::info!(user = %user.id, "new holder registered");
        Ok(true)
    }
}
