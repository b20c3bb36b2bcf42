//! Token amount scaling and fixed-decimal rendering
//!
//! Log records store both the raw smallest-unit amount and a human-readable
//! rendering with a fixed number of decimal places, rounded half-up.

use crate::error::{Result, TidemarkError};
use crate::types::{Amount, Balance};

/// Decimal places of the wrapped token
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in the smallest unit
pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000; // 10^18

/// Places used for the human-readable rendering in log records
pub const DISPLAY_DECIMALS: u32 = 6;

/// Largest decimals value whose scale factor fits in a u128
pub const MAX_DECIMALS: u32 = 38;

/// Render `amount / 10^decimals` with exactly `places` fractional digits.
///
/// When `places < decimals` the dropped digits are rounded half-up. When
/// `places > decimals` the fraction is zero-padded. `decimals` is capped at
/// [`MAX_DECIMALS`].
pub fn format_fixed(amount: Amount, decimals: u32, places: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let kept = places.min(decimals);
    let dropped = decimals - kept;

    let mut scaled = amount / 10u128.pow(dropped);
    if dropped > 0 {
        let remainder = amount % 10u128.pow(dropped);
        if remainder >= 5 * 10u128.pow(dropped - 1) {
            scaled += 1;
        }
    }

    let unit = 10u128.pow(kept);
    let whole = scaled / unit;
    if places == 0 {
        return whole.to_string();
    }

    let frac = scaled % unit;
    let mut out = if kept > 0 {
        format!("{whole}.{frac:0width$}", width = kept as usize)
    } else {
        format!("{whole}.")
    };
    out.extend(std::iter::repeat('0').take((places - kept) as usize));
    out
}

/// Signed counterpart of [`format_fixed`] for balances
pub fn format_balance(balance: Balance, decimals: u32, places: u32) -> String {
    let magnitude = format_fixed(balance.unsigned_abs(), decimals, places);
    if balance < 0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Parse a non-negative decimal string ("12", "0.5", "9.999999") into
/// smallest units.
pub fn parse_units(input: &str, decimals: u32) -> Result<Amount> {
    let invalid = || TidemarkError::InvalidAmount(input.to_string());
    if decimals > MAX_DECIMALS {
        return Err(invalid());
    }

    let (whole, frac) = match input.trim().split_once('.') {
        Some((w, f)) => (w, f),
        None => (input.trim(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(invalid());
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_units: Amount = if frac.is_empty() {
        0
    } else {
        let digits: Amount = frac.parse().map_err(|_| invalid())?;
        digits * 10u128.pow(decimals - frac.len() as u32)
    };

    whole
        .checked_mul(10u128.pow(decimals))
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(invalid)
}

/// Serde adapter for [`Amount`]: written as a decimal string, read from a
/// decimal string or a JSON integer.
pub mod serde_amount {
    use super::Amount;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Amount::try_from(v).map_err(|_| E::custom(format!("negative amount: {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.parse()
                .map_err(|_| E::custom(format!("invalid amount: {v}")))
        }
    }
}
