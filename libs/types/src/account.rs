//! The single cross-margined account aggregate.

use crate::ids::{OrderId, Symbol};
use crate::order::OpenOrder;
use crate::position::Position;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The engine's single writable aggregate: cash balance, positions per
/// symbol, and resting limit orders.
///
/// `positions` and `open_orders` are `IndexMap`s rather than `HashMap`s so
/// iteration order is deterministic and insertion-ordered — required for
/// the liquidation loop's "first seen wins" tie-break and for byte-identical
/// replay of an event sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: Decimal,
    pub positions: IndexMap<Symbol, Position>,
    pub open_orders: IndexMap<OrderId, OpenOrder>,
}

impl AccountState {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            balance: starting_balance,
            positions: IndexMap::new(),
            open_orders: IndexMap::new(),
        }
    }

    pub fn has_positions(&self) -> bool {
        !self.positions.is_empty()
    }
}
