//! # Tidemark Indexer
//!
//! Handlers for wrapped-token log events (Transfer, Deposit, Withdrawal,
//! Approval). Each handler writes an append-only log record and feeds the
//! resulting balance deltas into the [`tidemark_points`] engine.
//!
//! The host runtime owns chain connectivity, log decoding, reorgs and
//! persistence. It supplies a [`PointsStore`](tidemark_points::PointsStore)
//! and an [`EventLog`] and calls [`Indexer::handle`] once per event, in
//! chain order.

pub mod config;
pub mod events;
pub mod handlers;
pub mod logs;

pub use config::{IndexerConfig, LogFormat, LoggingConfig, TokenConfig};
pub use events::{ApprovalEvent, DepositEvent, EventMeta, TokenEvent, TransferEvent, WithdrawalEvent};
pub use handlers::{HandleOutcome, Indexer};
pub use logs::{AmountRendering, EventLog, LogRecord, MemoryEventLog};
