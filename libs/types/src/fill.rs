//! Executed-trade records.

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Size};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A completed trade that mutates position and balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub symbol: Symbol,
    pub side: Side,
    /// Base units, > 0.
    pub size: Size,
    pub price: Price,
    /// >= 0; zero for liquidation closes.
    pub fee: Decimal,
    /// Present when the fill originated from a resting or freshly-submitted
    /// limit order; absent for market fills.
    pub order_id: Option<OrderId>,
}

impl Fill {
    pub fn notional(&self) -> Decimal {
        self.size.as_decimal() * self.price.as_decimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn notional_is_size_times_price() {
        let fill = Fill {
            symbol: Symbol::new("BTC"),
            side: Side::Buy,
            size: Size::try_new(dec!(0.1)).unwrap(),
            price: Price::try_new(dec!(50000)).unwrap(),
            fee: dec!(2.25),
            order_id: None,
        };
        assert_eq!(fill.notional(), dec!(5000));
    }
}
