//! Record store seam between the engine and the host's persistence layer
//!
//! The host owns persistence and transaction semantics; the engine only
//! loads, mutates and saves records through this trait. [`MemoryStore`]
//! backs tests and the replay tool.

use crate::records::{GlobalStats, HourlySnapshot, User, WeeklyPoints};
use parking_lot::RwLock;
use std::collections::HashMap;
use tidemark_core::{Address, Result, TidemarkError};

/// Load/save access to the four accounting record types
pub trait PointsStore {
    fn user(&self, id: &Address) -> Result<Option<User>>;

    fn put_user(&self, user: User) -> Result<()>;

    fn weekly(&self, user: &Address, week: i64) -> Result<Option<WeeklyPoints>>;

    fn put_weekly(&self, bucket: WeeklyPoints) -> Result<()>;

    fn hourly(&self, user: &Address, hour: i64) -> Result<Option<HourlySnapshot>>;

    /// Insert a snapshot. Snapshots are write-once; implementations must
    /// reject a second insert for the same (user, hour).
    fn insert_hourly(&self, snapshot: HourlySnapshot) -> Result<()>;

    fn stats(&self) -> Result<Option<GlobalStats>>;

    fn put_stats(&self, stats: GlobalStats) -> Result<()>;
}

impl<S: PointsStore + ?Sized> PointsStore for &S {
    fn user(&self, id: &Address) -> Result<Option<User>> {
        (**self).user(id)
    }

    fn put_user(&self, user: User) -> Result<()> {
        (**self).put_user(user)
    }

    fn weekly(&self, user: &Address, week: i64) -> Result<Option<WeeklyPoints>> {
        (**self).weekly(user, week)
    }

    fn put_weekly(&self, bucket: WeeklyPoints) -> Result<()> {
        (**self).put_weekly(bucket)
    }

    fn hourly(&self, user: &Address, hour: i64) -> Result<Option<HourlySnapshot>> {
        (**self).hourly(user, hour)
    }

    fn insert_hourly(&self, snapshot: HourlySnapshot) -> Result<()> {
        (**self).insert_hourly(snapshot)
    }

    fn stats(&self) -> Result<Option<GlobalStats>> {
        (**self).stats()
    }

    fn put_stats(&self, stats: GlobalStats) -> Result<()> {
        (**self).put_stats(stats)
    }
}

/// In-memory record store
pub struct MemoryStore {
    users: RwLock<HashMap<Address, User>>,
    weekly: RwLock<HashMap<(Address, i64), WeeklyPoints>>,
    hourly: RwLock<HashMap<(Address, i64), HourlySnapshot>>,
    stats: RwLock<Option<GlobalStats>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            weekly: RwLock::new(HashMap::new()),
            hourly: RwLock::new(HashMap::new()),
            stats: RwLock::new(None),
        }
    }

    /// All users, ordered by address
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by_key(|u| u.id);
        users
    }

    /// All weekly buckets for one user, oldest week first
    pub fn weekly_for(&self, user: &Address) -> Vec<WeeklyPoints> {
        let mut buckets: Vec<WeeklyPoints> = self
            .weekly
            .read()
            .values()
            .filter(|b| &b.user == user)
            .cloned()
            .collect();
        buckets.sort_by_key(|b| b.week);
        buckets
    }

    /// All hourly snapshots for one user, oldest hour first
    pub fn hourly_for(&self, user: &Address) -> Vec<HourlySnapshot> {
        let mut snapshots: Vec<HourlySnapshot> = self
            .hourly
            .read()
            .values()
            .filter(|s| &s.user == user)
            .cloned()
            .collect();
        snapshots.sort_by_key(|s| s.hour);
        snapshots
    }

    pub fn snapshot_count(&self) -> usize {
        self.hourly.read().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PointsStore for MemoryStore {
    fn user(&self, id: &Address) -> Result<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }

    fn put_user(&self, user: User) -> Result<()> {
        self.users.write().insert(user.id, user);
        Ok(())
    }

    fn weekly(&self, user: &Address, week: i64) -> Result<Option<WeeklyPoints>> {
        Ok(self.weekly.read().get(&(*user, week)).cloned())
    }

    fn put_weekly(&self, bucket: WeeklyPoints) -> Result<()> {
        self.weekly.write().insert((bucket.user, bucket.week), bucket);
        Ok(())
    }

    fn hourly(&self, user: &Address, hour: i64) -> Result<Option<HourlySnapshot>> {
        Ok(self.hourly.read().get(&(*user, hour)).cloned())
    }

    fn insert_hourly(&self, snapshot: HourlySnapshot) -> Result<()> {
        let mut hourly = self.hourly.write();
        let key = (snapshot.user, snapshot.hour);
        if hourly.contains_key(&key) {
            return Err(TidemarkError::DuplicateSnapshot {
                user: snapshot.user,
                hour: snapshot.hour,
            });
        }
        hourly.insert(key, snapshot);
        Ok(())
    }

    fn stats(&self) -> Result<Option<GlobalStats>> {
        Ok(self.stats.read().clone())
    }

    fn put_stats(&self, stats: GlobalStats) -> Result<()> {
        *self.stats.write() = Some(stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;

    fn snapshot(user: Address, hour: i64) -> HourlySnapshot {
        HourlySnapshot {
            user,
            hour,
            week: 0,
            points_awarded: 1,
            tier: Tier::Tier1,
            balance: 0,
        }
    }

    #[test]
    fn test_missing_records() {
        let store = MemoryStore::new();
        let a = Address::new([1u8; 20]);
        assert!(store.user(&a).unwrap().is_none());
        assert!(store.weekly(&a, 0).unwrap().is_none());
        assert!(store.stats().unwrap().is_none());
    }

    #[test]
    fn test_hourly_is_write_once() {
        let store = MemoryStore::new();
        let a = Address::new([1u8; 20]);
        store.insert_hourly(snapshot(a, 3_600)).unwrap();

        let err = store.insert_hourly(snapshot(a, 3_600)).unwrap_err();
        assert_eq!(err, TidemarkError::DuplicateSnapshot { user: a, hour: 3_600 });

        // Different user, same hour is fine
        store.insert_hourly(snapshot(Address::new([2u8; 20]), 3_600)).unwrap();
        assert_eq!(store.snapshot_count(), 2);
    }

    #[test]
    fn test_store_through_reference() {
        let store = MemoryStore::new();
        let by_ref: &dyn PointsStore = &store;
        let a = Address::new([3u8; 20]);
        by_ref.put_user(User::new(a, 5)).unwrap();
        assert_eq!(store.users().len(), 1);
    }
}
