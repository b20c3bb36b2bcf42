//! UTC time buckets for point accrual
//!
//! Hour identifiers are the unix timestamp of the top of the UTC hour.
//! Week identifiers are the unix timestamp of the containing week's
//! Sunday 00:00:00 UTC.

use crate::error::{Result, TidemarkError};
use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds per hour
pub const SECS_PER_HOUR: i64 = 3_600;

/// Seconds per day
pub const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Floor a timestamp to the top of its UTC hour
pub fn hour_start(timestamp: i64) -> i64 {
    timestamp - timestamp.rem_euclid(SECS_PER_HOUR)
}

/// Sunday 00:00:00 UTC of the week containing `timestamp`
pub fn week_start(timestamp: i64) -> Result<i64> {
    let at = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or(TidemarkError::InvalidTimestamp(timestamp))?;
    let back = u64::from(at.weekday().num_days_from_sunday());
    let sunday = at
        .date_naive()
        .checked_sub_days(Days::new(back))
        .ok_or(TidemarkError::InvalidTimestamp(timestamp))?;
    Ok(sunday.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// The hour and week a timestamp falls into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBuckets {
    /// Top of the UTC hour
    pub hour: i64,
    /// Sunday 00:00 UTC of the week
    pub week: i64,
}

impl TimeBuckets {
    pub fn at(timestamp: i64) -> Result<Self> {
        Ok(Self {
            hour: hour_start(timestamp),
            week: week_start(timestamp)?,
        })
    }
}
