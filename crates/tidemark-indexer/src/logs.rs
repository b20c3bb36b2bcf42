//! Append-only log records, one per handled event
//!
//! Each record is keyed by [`EventMeta::record_id`] and carries the raw
//! amount next to its fixed-decimal rendering.

use crate::events::{ApprovalEvent, DepositEvent, EventMeta, TransferEvent, WithdrawalEvent};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tidemark_core::{format_fixed, serde_amount, Address, Amount, Result, TidemarkError};

/// Fields shared by every log record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogHeader {
    /// `{chain_id}_{block_number}_{log_index}`
    pub id: String,

    /// `{block_hash}_{log_index}`
    pub transaction_id: String,

    pub chain_id: u64,
    pub block_number: u64,
    pub log_index: u64,
    pub timestamp: i64,

    /// Raw amount in smallest units
    #[serde(with = "serde_amount")]
    pub amount: Amount,

    /// Human-readable amount with fixed decimals
    pub amount_display: String,
}

impl LogHeader {
    fn new(meta: &EventMeta, amount: Amount, render: &AmountRendering) -> Self {
        Self {
            id: meta.record_id(),
            transaction_id: meta.transaction_id(),
            chain_id: meta.chain_id,
            block_number: meta.block_number,
            log_index: meta.log_index,
            timestamp: meta.timestamp,
            amount,
            amount_display: render.render(amount),
        }
    }
}

/// Token decimals and rendering precision for `amount_display`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountRendering {
    pub decimals: u32,
    pub places: u32,
}

impl AmountRendering {
    pub fn render(&self, amount: Amount) -> String {
        format_fixed(amount, self.decimals, self.places)
    }
}

impl Default for AmountRendering {
    fn default() -> Self {
        Self {
            decimals: tidemark_core::TOKEN_DECIMALS,
            places: tidemark_core::DISPLAY_DECIMALS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLog {
    #[serde(flatten)]
    pub header: LogHeader,
    pub src: Address,
    pub dst: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositLog {
    #[serde(flatten)]
    pub header: LogHeader,
    pub dst: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalLog {
    #[serde(flatten)]
    pub header: LogHeader,
    pub src: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalLog {
    #[serde(flatten)]
    pub header: LogHeader,
    pub owner: Address,
    pub spender: Address,
}

/// Any log record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LogRecord {
    Transfer(TransferLog),
    Deposit(DepositLog),
    Withdrawal(WithdrawalLog),
    Approval(ApprovalLog),
}

impl LogRecord {
    pub fn header(&self) -> &LogHeader {
        match self {
            Self::Transfer(r) => &r.header,
            Self::Deposit(r) => &r.header,
            Self::Withdrawal(r) => &r.header,
            Self::Approval(r) => &r.header,
        }
    }

    pub fn id(&self) -> &str {
        &self.header().id
    }

    pub fn transfer(event: &TransferEvent, render: &AmountRendering) -> Self {
        Self::Transfer(TransferLog {
            header: LogHeader::new(&event.meta, event.amount, render),
            src: event.src,
            dst: event.dst,
        })
    }

    pub fn deposit(event: &DepositEvent, render: &AmountRendering) -> Self {
        Self::Deposit(DepositLog {
            header: LogHeader::new(&event.meta, event.amount, render),
            dst: event.dst,
        })
    }

    pub fn withdrawal(event: &WithdrawalEvent, render: &AmountRendering) -> Self {
        Self::Withdrawal(WithdrawalLog {
            header: LogHeader::new(&event.meta, event.amount, render),
            src: event.src,
        })
    }

    pub fn approval(event: &ApprovalEvent, render: &AmountRendering) -> Self {
        Self::Approval(ApprovalLog {
            header: LogHeader::new(&event.meta, event.amount, render),
            owner: event.owner,
            spender: event.spender,
        })
    }
}

/// Append-only sink for log records
pub trait EventLog {
    /// Append a record. Ids are unique; a second append with the same id
    /// is rejected.
    fn append(&self, record: LogRecord) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<LogRecord>>;
}

impl<L: EventLog + ?Sized> EventLog for &L {
    fn append(&self, record: LogRecord) -> Result<()> {
        (**self).append(record)
    }

    fn get(&self, id: &str) -> Result<Option<LogRecord>> {
        (**self).get(id)
    }
}

/// In-memory log, kept in append order
pub struct MemoryEventLog {
    records: RwLock<IndexMap<String, LogRecord>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(IndexMap::new()),
        }
    }

    /// All records in append order
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog for MemoryEventLog {
    fn append(&self, record: LogRecord) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(record.id()) {
            return Err(TidemarkError::DuplicateLogRecord(record.id().to_string()));
        }
        records.insert(record.id().to_string(), record);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<LogRecord>> {
        Ok(self.records.read().get(id).cloned())
    }
}
