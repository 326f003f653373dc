//! Fixed-point decimal newtypes for prices and sizes.
//!
//! Backed by `rust_decimal::Decimal` so every monetary comparison in the
//! engine (balance, PnL, fees) is exact rather than epsilon-bounded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("value must be strictly positive, got {0}")]
    NotPositive(String),
    #[error("failed to parse decimal: {0}")]
    Parse(String),
}

/// A strictly-positive price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Fails if `value` is not strictly positive.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(NumericError::NotPositive(value.to_string()))
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = Decimal::from_str(s).map_err(|e| NumericError::Parse(e.to_string()))?;
        Self::try_new(d)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative size (base units or USD, depending on context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(Decimal);

impl Size {
    /// Fails if `value` is negative.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(NumericError::NotPositive(value.to_string()))
        }
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Size {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = Decimal::from_str(s).map_err(|e| NumericError::Parse(e.to_string()))?;
        Self::try_new(d)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Size {
    type Output = Size;
    fn add(self, rhs: Size) -> Size {
        Size(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Size {
    type Output = Size;
    fn sub(self, rhs: Size) -> Size {
        Size(self.0 - rhs.0)
    }
}
