//! Position tracking.

use crate::ids::Symbol;
use crate::numeric::{Price, Size};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open position in one symbol. At most one per symbol in an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub side: Side,
    /// > 0; a zero-sized position is deleted, never stored.
    pub size: Size,
    pub entry_price: Price,
    /// Integer leverage, >= 1, fixed at the moment of the position's creation.
    pub leverage: u32,
    /// `1 / (2 * leverage)`, computed once at creation.
    pub mmr: Decimal,
}

impl Position {
    /// `mmr = 1 / (2 * leverage)`, per the invariant that it is fixed when
    /// the position is born and never recomputed from a later leverage change.
    pub fn mmr_for_leverage(leverage: u32) -> Decimal {
        Decimal::ONE / (Decimal::from(2u32) * Decimal::from(leverage))
    }

    pub fn new(symbol: Symbol, side: Side, size: Size, entry_price: Price, leverage: u32) -> Self {
        Self {
            symbol,
            side,
            size,
            entry_price,
            leverage,
            mmr: Self::mmr_for_leverage(leverage),
        }
    }

    /// `notional = size * entry_price`.
    pub fn notional(&self) -> Decimal {
        self.size.as_decimal() * self.entry_price.as_decimal()
    }
}
