//! Order-intent and resting-order types.

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Size};
use serde::{Deserialize, Serialize};

/// Direction of a position or order. `sign() == +1` for Buy, `-1` for Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// `+1` for Buy, `-1` for Sell — the coefficient in every side-aware formula.
    pub fn sign(&self) -> i32 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

/// Execution style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
}

/// Denomination of an intent's `size_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    Usd,
    Base,
}

/// Immutable external request to trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    /// Non-negative; denominated per `size_unit`.
    pub size_value: rust_decimal::Decimal,
    pub size_unit: SizeUnit,
    /// Integer leverage, >= 1.
    pub leverage: u32,
    /// Required when `order_type == Limit`.
    pub limit_price: Option<Price>,
    pub reduce_only: bool,
    pub client_id: String,
    pub timestamp: i64,
}

/// A resting limit order sitting in the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    /// Base units, > 0.
    pub size: Size,
    pub limit_price: Price,
    pub leverage: u32,
    pub reduce_only: bool,
    pub client_id: String,
    pub timestamp: i64,
}
