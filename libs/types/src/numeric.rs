//! Native value amounts
//!
//! All ledger arithmetic is done on `Wei`, an unsigned count of the smallest
//! indivisible unit of the native asset. Ether-denominated strings are parsed
//! and rendered through rust_decimal so no floating point ever touches an
//! amount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places between one ether and one wei.
pub const ETHER_DECIMALS: u32 = 18;

/// Wei per ether (10^18).
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Errors raised while converting textual amounts into `Wei`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Malformed amount: {input}")]
    Malformed { input: String },

    #[error("Amount must not be negative: {input}")]
    Negative { input: String },

    #[error("Amount has more than 18 decimal places: {input}")]
    SubWeiPrecision { input: String },

    #[error("Amount out of range: {input}")]
    OutOfRange { input: String },
}

/// Amount of native value in its smallest unit.
///
/// Non-negative by construction. Arithmetic is checked; callers decide how an
/// overflow or underflow maps onto their own error taxonomy.
///
/// Serialized as a decimal string of wei so values above `u64::MAX` survive
/// JSON consumers that read numbers as doubles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);
    pub const MAX: Wei = Wei(u128::MAX);

    /// Wrap a raw wei count.
    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    /// Whole ether amount. Any `u64` fits: u64::MAX ether is below u128::MAX wei.
    pub const fn ether(whole: u64) -> Self {
        Self(whole as u128 * WEI_PER_ETHER)
    }

    /// Parse an ether-denominated decimal string such as `"9.5"` or `"0.001"`.
    pub fn from_ether_str(input: &str) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        let value = Decimal::from_str(trimmed).map_err(|_| AmountError::Malformed {
            input: trimmed.to_string(),
        })?;
        Self::from_ether(value)
    }

    /// Convert an ether-denominated decimal into wei.
    pub fn from_ether(value: Decimal) -> Result<Self, AmountError> {
        let input = value.to_string();
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative { input });
        }
        if value.normalize().scale() > ETHER_DECIMALS {
            return Err(AmountError::SubWeiPrecision { input });
        }

        // Split into integer and fractional parts so large amounts never
        // overflow Decimal's 96-bit mantissa on the way to u128.
        let whole = value.trunc();
        let fraction = value - whole;
        let whole_wei = whole
            .to_u128()
            .and_then(|w| w.checked_mul(WEI_PER_ETHER))
            .ok_or_else(|| AmountError::OutOfRange {
                input: input.clone(),
            })?;
        let fraction_wei = (fraction * Decimal::from(WEI_PER_ETHER as u64))
            .to_u128()
            .ok_or_else(|| AmountError::OutOfRange {
                input: input.clone(),
            })?;

        whole_wei
            .checked_add(fraction_wei)
            .map(Self)
            .ok_or(AmountError::OutOfRange { input })
    }

    /// Raw wei count.
    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Ether-denominated view, normalized (`9.5`, not `9.500000000000000000`).
    ///
    /// `None` when the amount exceeds Decimal's 96-bit mantissa
    /// (roughly 7.9 * 10^10 ether).
    pub fn to_ether(&self) -> Option<Decimal> {
        let mantissa = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(mantissa, ETHER_DECIMALS)
            .ok()
            .map(|d| d.normalize())
    }

    pub fn checked_add(self, other: Wei) -> Option<Wei> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Wei) -> Option<Wei> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Wei) -> Wei {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl From<u128> for Wei {
    fn from(wei: u128) -> Self {
        Self(wei)
    }
}

impl FromStr for Wei {
    type Err = AmountError;

    /// Accepts `"<n> wei"` / `"<n>wei"` for raw counts, anything else is
    /// read as ether.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.strip_suffix("wei") {
            Some(raw) => raw
                .trim()
                .parse::<u128>()
                .map(Self)
                .map_err(|_| AmountError::Malformed {
                    input: trimmed.to_string(),
                }),
            None => Self::from_ether_str(trimmed),
        }
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct WeiVisitor;

impl<'de> Visitor<'de> for WeiVisitor {
    type Value = Wei;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a wei amount as a decimal string or unsigned integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Wei, E> {
        v.parse::<u128>().map(Wei).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Wei, E> {
        Ok(Wei(u128::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Wei, E> {
        Ok(Wei(v))
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WeiVisitor)
    }
}
