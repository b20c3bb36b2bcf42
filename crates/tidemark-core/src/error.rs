//! Error types for Tidemark core operations

use crate::types::Address;
use thiserror::Error;

/// Result type alias for Tidemark operations
pub type Result<T> = std::result::Result<T, TidemarkError>;

/// Errors that can occur across the Tidemark crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TidemarkError {
    // === Input Decoding ===
    /// Address is not 20 bytes of hex
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount string could not be parsed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Timestamp outside the representable UTC range
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    // === Storage Errors ===
    /// Hourly snapshots are write-once
    #[error("Hourly snapshot already exists for {user} at hour {hour}")]
    DuplicateSnapshot { user: Address, hour: i64 },

    /// Log records are append-only
    #[error("Log record already exists: {0}")]
    DuplicateLogRecord(String),

    /// Host store failure
    #[error("Storage error: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    // === Configuration ===
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TidemarkError {
    /// Errors caused by malformed input rather than the store
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_) | Self::InvalidAmount(_) | Self::InvalidTimestamp(_)
        )
    }
}
