//! Balance deltas and tier updates
//!
//! Balances only move through [`PointsEngine::credit`] and
//! [`PointsEngine::debit`]. Debits are not checked against the current
//! balance; a holder can go negative if upstream ordering is off.
//!
//! Both operations validate the amount, the resulting balance and the
//! timestamp before touching the store, so a rejected delta leaves no trace.
//! [`PointsEngine::check_transfer`] runs the same checks for a whole event
//! up front.

use crate::accrual::AccrualOutcome;
use crate::engine::PointsEngine;
use crate::records::User;
use crate::store::PointsStore;
use crate::tier::classify;
use tidemark_core::{Address, Amount, Balance, Result, TidemarkError, TimeBuckets};

fn signed(amount: Amount) -> Result<Balance> {
    Balance::try_from(amount).map_err(|_| TidemarkError::InvalidAmount(amount.to_string()))
}

fn credited(balance: Balance, amount: Amount) -> Result<Balance> {
    balance
        .checked_add(signed(amount)?)
        .ok_or_else(|| TidemarkError::InvalidAmount(amount.to_string()))
}

fn debited(balance: Balance, amount: Amount) -> Result<Balance> {
    balance
        .checked_sub(signed(amount)?)
        .ok_or_else(|| TidemarkError::InvalidAmount(amount.to_string()))
}

impl<S: PointsStore> PointsEngine<S> {
    /// Store `new_balance` on `user`, re-classify, and move the user between
    /// histogram slots if the tier changed. Returns the saved user.
    pub fn apply_balance_change(&self, mut user: User, new_balance: Balance, timestamp: i64) -> Result<User> {
        let old_tier = user.tier;
        let new_tier = classify(new_balance);

        if old_tier != new_tier {
            if user.counted {
                let mut stats = self.global_stats()?;
                if !stats.move_tier(old_tier, new_tier) {
                    tracing::warn!(
                        user = %user.id,
                        %old_tier,
                        "tier histogram underflow, count floored at zero"
                    );
                }
                self.store().put_stats(stats)?;
            }
            tracing::info!(user = %user.id, %old_tier, %new_tier, "tier changed");
        }

        user.balance = new_balance;
        user.tier = new_tier;
        user.last_updated = timestamp;
        self.store().put_user(user.clone())?;
        Ok(user)
    }

    /// Check that debiting `src` and then crediting `dst` by `amount` at
    /// `timestamp` would succeed. Either side may be absent. Nothing is
    /// written.
    pub fn check_transfer(
        &self,
        src: Option<&Address>,
        dst: Option<&Address>,
        amount: Amount,
        timestamp: i64,
    ) -> Result<()> {
        TimeBuckets::at(timestamp)?;
        signed(amount)?;

        let mut src_after = None;
        if let Some(src) = src {
            src_after = Some((src, debited(self.balance_of(src)?, amount)?));
        }
        if let Some(dst) = dst {
            let current = match src_after {
                Some((src, balance)) if src == dst => balance,
                _ => self.balance_of(dst)?,
            };
            credited(current, amount)?;
        }
        Ok(())
    }

    fn balance_of(&self, id: &Address) -> Result<Balance> {
        Ok(self.store().user(id)?.map_or(0, |user| user.balance))
    }

    /// Credit `amount` to `id` (transfer receiver or depositor), then accrue
    /// at the new balance. First-time recipients are counted.
    pub fn credit(&self, id: &Address, amount: Amount, timestamp: i64) -> Result<(User, AccrualOutcome)> {
        TimeBuckets::at(timestamp)?;
        let mut user = self.user_or_new(id, timestamp)?;
        let new_balance = credited(user.balance, amount)?;

        self.register_credited(&mut user)?;
        self.apply_balance_change(user, new_balance, timestamp)?;
        let outcome = self.accrue(id, new_balance, timestamp)?;
        Ok((self.user_or_new(id, timestamp)?, outcome))
    }

    /// Debit `amount` from `id` (transfer sender or withdrawer), then accrue
    /// at the new balance. The result is not clamped at zero.
    pub fn debit(&self, id: &Address, amount: Amount, timestamp: i64) -> Result<(User, AccrualOutcome)> {
        TimeBuckets::at(timestamp)?;
        let user = self.user_or_new(id, timestamp)?;
        let new_balance = debited(user.balance, amount)?;
        if new_balance < 0 {
            tracing::warn!(
                user = %id,
                balance = %new_balance,
                "debit left a negative balance"
            );
        }

        self.apply_balance_change(user, new_balance, timestamp)?;
        let outcome = self.accrue(id, new_balance, timestamp)?;
        Ok((self.user_or_new(id, timestamp)?, outcome))
    }
}
