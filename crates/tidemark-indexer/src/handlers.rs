//! Event handlers: map each event to balance deltas and a log record
//!
//! | Event | Balance effect | Accrual |
//! |-------|----------------|---------|
//! | Transfer(src, dst, x) | src -= x, dst += x (zero address skipped per side) | both sides |
//! | Deposit(dst, x) | dst += x | dst |
//! | Withdrawal(src, x) | src -= x, unclamped | src |
//! | Approval | none | none |

use crate::config::IndexerConfig;
use crate::events::{
    ApprovalEvent, DepositEvent, EventMeta, TokenEvent, TransferEvent, WithdrawalEvent,
};
use crate::logs::{AmountRendering, EventLog, LogRecord};
use serde::Serialize;
use tidemark_core::{Address, Result};
use tidemark_points::{AccrualOutcome, PointsEngine, PointsStore};

/// Result of handling one event
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum HandleOutcome {
    /// Filtered out by chain or contract
    Skipped,

    /// Logged and applied; one accrual per processed side
    Applied {
        record_id: String,
        accruals: Vec<(Address, AccrualOutcome)>,
    },
}

impl HandleOutcome {
    /// Points awarded across all sides of the event
    pub fn points(&self) -> u64 {
        match self {
            Self::Skipped => 0,
            Self::Applied { accruals, .. } => accruals.iter().map(|(_, o)| o.points()).sum(),
        }
    }
}

/// Wrapped-token indexer over a points store and an event log.
///
/// Events must be handled exactly once and in chain order; see
/// [`PointsEngine`] for why. Each handler validates its balance deltas
/// before appending the log record, so a rejected event is neither logged
/// nor applied and can be redelivered once fixed upstream.
pub struct Indexer<S, L> {
    engine: PointsEngine<S>,
    log: L,
    rendering: AmountRendering,
    chain_id: Option<u64>,
    contract: Option<Address>,
}

impl<S: PointsStore, L: EventLog> Indexer<S, L> {
    pub fn new(store: S, log: L, config: &IndexerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: PointsEngine::new(store),
            log,
            rendering: config.token.rendering(),
            chain_id: config.indexer.chain_id,
            contract: config.indexer.contract,
        })
    }

    pub fn engine(&self) -> &PointsEngine<S> {
        &self.engine
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Dispatch one event to its handler
    pub fn handle(&self, event: &TokenEvent) -> Result<HandleOutcome> {
        if !self.accepts(event.meta()) {
            tracing::debug!(
                event = event.name(),
                record = %event.meta().record_id(),
                "event filtered out"
            );
            return Ok(HandleOutcome::Skipped);
        }

        match event {
            TokenEvent::Transfer(e) => self.on_transfer(e),
            TokenEvent::Deposit(e) => self.on_deposit(e),
            TokenEvent::Withdrawal(e) => self.on_withdrawal(e),
            TokenEvent::Approval(e) => self.on_approval(e),
        }
    }

    fn accepts(&self, meta: &EventMeta) -> bool {
        let chain_ok = self.chain_id.map_or(true, |id| id == meta.chain_id);
        let contract_ok = match (self.contract, meta.contract) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        };
        chain_ok && contract_ok
    }

    pub fn on_transfer(&self, event: &TransferEvent) -> Result<HandleOutcome> {
        let src = Some(&event.src).filter(|a| !a.is_zero());
        let dst = Some(&event.dst).filter(|a| !a.is_zero());
        self.engine
            .check_transfer(src, dst, event.amount, event.meta.timestamp)?;

        let record = LogRecord::transfer(event, &self.rendering);
        let record_id = record.id().to_string();
        self.log.append(record)?;

        let ts = event.meta.timestamp;
        let mut accruals = Vec::with_capacity(2);
        if let Some(src) = src {
            let (_, outcome) = self.engine.debit(src, event.amount, ts)?;
            accruals.push((*src, outcome));
        }
        if let Some(dst) = dst {
            let (_, outcome) = self.engine.credit(dst, event.amount, ts)?;
            accruals.push((*dst, outcome));
        }

        tracing::debug!(record = %record_id, src = %event.src, dst = %event.dst, "transfer applied");
        Ok(HandleOutcome::Applied { record_id, accruals })
    }

    pub fn on_deposit(&self, event: &DepositEvent) -> Result<HandleOutcome> {
        self.engine
            .check_transfer(None, Some(&event.dst), event.amount, event.meta.timestamp)?;

        let record = LogRecord::deposit(event, &self.rendering);
        let record_id = record.id().to_string();
        self.log.append(record)?;

        let (_, outcome) = self.engine.credit(&event.dst, event.amount, event.meta.timestamp)?;

        tracing::debug!(record = %record_id, dst = %event.dst, "deposit applied");
        Ok(HandleOutcome::Applied {
            record_id,
            accruals: vec![(event.dst, outcome)],
        })
    }

    pub fn on_withdrawal(&self, event: &WithdrawalEvent) -> Result<HandleOutcome> {
        self.engine
            .check_transfer(Some(&event.src), None, event.amount, event.meta.timestamp)?;

        let record = LogRecord::withdrawal(event, &self.rendering);
        let record_id = record.id().to_string();
        self.log.append(record)?;

        let (_, outcome) = self.engine.debit(&event.src, event.amount, event.meta.timestamp)?;

        tracing::debug!(record = %record_id, src = %event.src, "withdrawal applied");
        Ok(HandleOutcome::Applied {
            record_id,
            accruals: vec![(event.src, outcome)],
        })
    }

    pub fn on_approval(&self, event: &ApprovalEvent) -> Result<HandleOutcome> {
        let record = LogRecord::approval(event, &self.rendering);
        let record_id = record.id().to_string();
        self.log.append(record)?;

        Ok(HandleOutcome::Applied {
            record_id,
            accruals: Vec::new(),
        })
    }
}
