//! # Hourly Accrual
//!
//! A holder earns `points_per_hour(tier)` at most once per UTC hour, no
//! matter how many balance changes land in that hour. The first event of the
//! hour writes an [`HourlySnapshot`]; later events in the same hour find it
//! and do nothing. Awards are clamped to what the week's bucket has left.

use crate::engine::PointsEngine;
use crate::records::HourlySnapshot;
use crate::store::PointsStore;
use crate::tier::{classify, Tier};
use serde::{Deserialize, Serialize};
use tidemark_core::{Address, Balance, Result, TimeBuckets};

/// What a call to [`PointsEngine::accrue`] did
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccrualOutcome {
    /// Balance was zero or negative
    NoBalance,

    /// Tier earns nothing
    ZeroRate,

    /// A snapshot already exists for this hour
    AlreadyAccrued { hour: i64 },

    /// A snapshot was written; `points` may be 0 if the cap was hit
    Awarded {
        points: u64,
        tier: Tier,
        hour: i64,
        week: i64,
        cap_reached: bool,
    },
}

impl AccrualOutcome {
    /// Points awarded by this call
    pub fn points(&self) -> u64 {
        match self {
            Self::Awarded { points, .. } => *points,
            _ => 0,
        }
    }
}

impl<S: PointsStore> PointsEngine<S> {
    /// Accrue the current hour's points for `user_id` holding `balance`.
    ///
    /// Writes the hourly snapshot, the weekly bucket, the user's lifetime
    /// total and the global stats. Idempotent within one UTC hour.
    pub fn accrue(&self, user_id: &Address, balance: Balance, timestamp: i64) -> Result<AccrualOutcome> {
        if balance <= 0 {
            return Ok(AccrualOutcome::NoBalance);
        }

        let tier = classify(balance);
        let rate = tier.points_per_hour();
        if rate == 0 {
            return Ok(AccrualOutcome::ZeroRate);
        }

        let buckets = TimeBuckets::at(timestamp)?;
        if self.store().hourly(user_id, buckets.hour)?.is_some() {
            tracing::trace!(user = %user_id, hour = buckets.hour, "hour already accrued");
            return Ok(AccrualOutcome::AlreadyAccrued { hour: buckets.hour });
        }

        let mut bucket = self.week_bucket(user_id, buckets.week, tier)?;
        let awarded = bucket.award(rate);
        let cap_reached = bucket.is_cap_reached;

        self.store().insert_hourly(HourlySnapshot {
            user: *user_id,
            hour: buckets.hour,
            week: buckets.week,
            points_awarded: awarded,
            tier,
            balance,
        })?;
        self.store().put_weekly(bucket)?;

        let mut user = self.user_or_new(user_id, timestamp)?;
        user.total_points += awarded;
        self.store().put_user(user)?;

        let mut stats = self.global_stats()?;
        stats.record_award(awarded, buckets.hour, buckets.week);
        self.store().put_stats(stats)?;

        tracing::debug!(
            user = %user_id,
            %tier,
            hour = buckets.hour,
            awarded,
            cap_reached,
            "hourly points accrued"
        );

        Ok(AccrualOutcome::Awarded {
            points: awarded,
            tier,
            hour: buckets.hour,
            week: buckets.week,
            cap_reached,
        })
    }
}
