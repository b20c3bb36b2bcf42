//! Decoded wrapped-token log events
//!
//! The host decodes raw logs; these types are what it hands to the
//! [`Indexer`](crate::Indexer). Serialized as JSON with an `"event"` tag:
//!
//! ```text
//! {"event":"Deposit","meta":{...},"dst":"0x..","amount":"15000000000000000000"}
//! ```

use serde::{Deserialize, Serialize};
use tidemark_core::{serde_amount, Address, Amount};

/// Position and timing of a log within the chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Chain identifier
    pub chain_id: u64,

    /// Block number
    pub block_number: u64,

    /// Block hash (hex)
    pub block_hash: String,

    /// Log index within the block
    pub log_index: u64,

    /// Block timestamp, seconds since epoch
    pub timestamp: i64,

    /// Emitting contract, when the host supplies it
    #[serde(default)]
    pub contract: Option<Address>,
}

impl EventMeta {
    /// Primary key of the log record: `{chain_id}_{block_number}_{log_index}`
    pub fn record_id(&self) -> String {
        format!("{}_{}_{}", self.chain_id, self.block_number, self.log_index)
    }

    /// Transaction identifier: `{block_hash}_{log_index}`
    pub fn transaction_id(&self) -> String {
        format!("{}_{}", self.block_hash, self.log_index)
    }
}

/// `Transfer(src, dst, wad)`; a zero `src` is a mint, a zero `dst` a burn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub meta: EventMeta,
    pub src: Address,
    pub dst: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

/// `Deposit(dst, wad)`: native currency wrapped
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub meta: EventMeta,
    pub dst: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

/// `Withdrawal(src, wad)`: wrapped token redeemed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalEvent {
    pub meta: EventMeta,
    pub src: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

/// `Approval(owner, spender, wad)`: logged only
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub meta: EventMeta,
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

/// Any event the indexer handles
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TokenEvent {
    Transfer(TransferEvent),
    Deposit(DepositEvent),
    Withdrawal(WithdrawalEvent),
    Approval(ApprovalEvent),
}

impl TokenEvent {
    pub fn meta(&self) -> &EventMeta {
        match self {
            Self::Transfer(e) => &e.meta,
            Self::Deposit(e) => &e.meta,
            Self::Withdrawal(e) => &e.meta,
            Self::Approval(e) => &e.meta,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer(_) => "Transfer",
            Self::Deposit(_) => "Deposit",
            Self::Withdrawal(_) => "Withdrawal",
            Self::Approval(_) => "Approval",
        }
    }

    /// Chain order key: (block number, log index)
    pub fn position(&self) -> (u64, u64) {
        let meta = self.meta();
        (meta.block_number, meta.log_index)
    }
}
