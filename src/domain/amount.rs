//! Amount type
//!
//! Domain primitive for monetary amounts with validation at construction
//! time, so invalid values cannot reach the store.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Maximum allowed amount. Matches what a NUMERIC(20,8) column can hold
/// in front of the decimal point.
const MAX_AMOUNT: &str = "1000000000000";

/// Maximum decimal places, matching the NUMERIC(20,8) column scale.
const MAX_SCALE: u32 = 8;

/// A validated monetary amount.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 8 decimal places
/// - Bounded by `MAX_AMOUNT`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 8 decimal places
    /// - `AmountError::Overflow` if value exceeds the column capacity
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        let max = Decimal::from_str(MAX_AMOUNT).expect("Invalid MAX_AMOUNT constant");
        if value > max {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
