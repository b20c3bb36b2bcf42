//! Points engine entry point
//!
//! [`PointsEngine`] wraps a [`PointsStore`] and exposes the per-event
//! operations. The accrual, balance, weekly and stats logic live in their
//! own modules as `impl` blocks on this type.
//!
//! ## Preconditions
//!
//! The engine does not deduplicate or reorder. Callers must deliver
//! balance-changing events exactly once, in ascending (block number, log
//! index) order, and finish each event before starting the next. Weekly caps,
//! hourly snapshots and the tier histogram are only correct under that
//! ordering.

use crate::records::User;
use crate::store::PointsStore;
use tidemark_core::{Address, Result};

pub struct PointsEngine<S> {
    store: S,
}

impl<S: PointsStore> PointsEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Fetch a user, default-constructing it on first sighting
    pub fn user_or_new(&self, id: &Address, timestamp: i64) -> Result<User> {
        Ok(self
            .store
            .user(id)?
            .unwrap_or_else(|| User::new(*id, timestamp)))
    }
}
