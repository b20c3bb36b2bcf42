//! # Tidemark Points - Tier & Points Accrual Engine
//!
//! Loyalty accounting for holders of a wrapped token.
//!
//! ## Key Features
//!
//! - **Tier classification**: five tiers from fixed whole-token thresholds
//! - **Hourly accrual**: at most one award per holder per UTC hour
//! - **Weekly caps**: per-holder buckets anchored on Sunday 00:00 UTC, cap
//!   fixed when the bucket opens
//! - **Aggregate stats**: user count, points distributed, tier histogram
//!
//! ## Per-Event Flow
//!
//! ```text
//!   credit/debit ──► apply_balance_change ──► accrue
//!        │                  │                   │
//!        ▼                  ▼                   ▼
//!   register_credited   tier histogram    HourlySnapshot
//!   (first credit)      move              WeeklyPoints
//!                                         User.total_points
//!                                         GlobalStats
//! ```
//!
//! All state lives behind a [`PointsStore`]. The engine assumes strictly
//! ordered, exactly-once delivery; see [`engine`] for the preconditions.

pub mod accrual;
pub mod balance;
pub mod engine;
pub mod records;
pub mod stats;
pub mod store;
pub mod tier;
pub mod weekly;

// Re-exports
pub use accrual::AccrualOutcome;
pub use engine::PointsEngine;
pub use records::{GlobalStats, HourlySnapshot, TierHistogram, User, WeeklyPoints};
pub use store::{MemoryStore, PointsStore};
pub use tier::{classify, Tier};
