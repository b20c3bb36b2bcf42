//! Core type definitions for Tidemark
//!
//! Addresses are 20-byte account identifiers rendered as `0x`-prefixed
//! lowercase hex. Amounts carried by events are unsigned; balances are
//! signed because debits are applied without a sufficiency check.

use crate::error::{Result, TidemarkError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unsigned token amount in the smallest unit
pub type Amount = u128;

/// Signed balance in the smallest unit
pub type Balance = i128;

/// Account address (20 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address {
    bytes: [u8; 20],
}

impl Address {
    /// The zero address; mint and burn endpoints
    pub const ZERO: Self = Self { bytes: [0u8; 20] };

    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.bytes
    }

    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 20]
    }

    /// Convert to `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parse from hex, with or without the `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let decoded =
            hex::decode(trimmed).map_err(|e| TidemarkError::InvalidAddress(format!("{s}: {e}")))?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|v: Vec<u8>| TidemarkError::InvalidAddress(format!("{s}: {} bytes", v.len())))?;
        Ok(Self { bytes })
    }
}

impl FromStr for Address {
    type Err = TidemarkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..10])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
