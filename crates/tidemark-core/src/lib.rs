//! # Tidemark Core
//!
//! Shared building blocks for the Tidemark wrapped-token indexer:
//! - `Address` - 20-byte account identifier with hex serde
//! - `Amount` / `Balance` - smallest-unit token quantities
//! - `TimeBuckets` - UTC hour and Sunday-anchored week identifiers
//! - fixed-decimal rendering of token amounts

pub mod amount;
pub mod clock;
pub mod error;
pub mod types;

pub use amount::*;
pub use clock::*;
pub use error::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::amount::{format_fixed, ONE_TOKEN, TOKEN_DECIMALS};
    pub use crate::clock::TimeBuckets;
    pub use crate::error::{Result, TidemarkError};
    pub use crate::types::*;
}
