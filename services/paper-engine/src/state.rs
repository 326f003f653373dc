//! The engine state machine: owns the account, the price book, and the
//! open-order book; dispatches the three event kinds.

use crate::config::EngineConfig;
use crate::events::{CancelResult, OrderResult};
use crate::execution;
use crate::risk;
use paper_types::account::AccountState;
use paper_types::errors::EngineError;
use paper_types::ids::{OrderId, Symbol};
use paper_types::numeric::{Price, Size};
use paper_types::order::{OpenOrder, OrderIntent, OrderType, Side, SizeUnit};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The single-writer, synchronous matching and risk engine. No method here
/// performs I/O or suspends; every call runs to completion and returns a
/// result record.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    account: AccountState,
    prices: HashMap<Symbol, Decimal>,
    liquidations_total: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let starting_balance = config.starting_balance;
        Self {
            config,
            account: AccountState::new(starting_balance),
            prices: HashMap::new(),
            liquidations_total: 0,
        }
    }

    /// Resume from a previously snapshotted account (e.g. rehydrated by the
    /// persistence collaborator on startup).
    pub fn with_account(config: EngineConfig, account: AccountState) -> Self {
        Self {
            config,
            account,
            prices: HashMap::new(),
            liquidations_total: 0,
        }
    }

    /// Total positions closed by the liquidation loop over this engine's
    /// lifetime — observational only, exposed for monitoring.
    pub fn liquidations_total(&self) -> u64 {
        self.liquidations_total
    }

    /// `on_price_update`: records the new mid, consumes any resting limit
    /// orders on that symbol that now cross, and runs the liquidation loop
    /// if any order fired.
    pub fn on_price_update(&mut self, symbol: Symbol, price: Decimal) {
        self.prices.insert(symbol.clone(), price);

        let matching_order_ids: Vec<OrderId> = self
            .account
            .open_orders
            .iter()
            .filter(|(_, order)| order.symbol == symbol)
            .map(|(id, _)| *id)
            .collect();

        let mut any_fired = false;
        for order_id in matching_order_ids {
            let order = match self.account.open_orders.get(&order_id) {
                Some(o) => o.clone(),
                None => continue,
            };
            if execution::limit_crosses(&order, price, self.config.tick_size) {
                let fill = execution::limit_fill(&order, self.config.taker_fee_rate);
                // Whether this succeeds or hits a leverage conflict, the
                // resting order is consumed: silently dropped on conflict.
                let _ = execution::apply_fill_to_account(
                    &mut self.account,
                    &fill,
                    order.leverage,
                    true,
                );
                self.account.open_orders.shift_remove(&order_id);
                any_fired = true;
            }
        }

        if any_fired {
            self.run_liquidation();
        }
    }

    /// `on_order`: validates the intent, routes to market or limit
    /// execution, and runs the liquidation loop on any state change.
    pub fn on_order(&mut self, intent: OrderIntent) -> OrderResult {
        if let Err(e) = validate_intent(&intent) {
            return OrderResult::Rejected { reason: e.to_string() };
        }

        let mid = match self.prices.get(&intent.symbol).copied() {
            Some(mid) => mid,
            None => {
                return OrderResult::Rejected {
                    reason: EngineError::NoPrice {
                        symbol: intent.symbol.to_string(),
                    }
                    .to_string(),
                }
            }
        };

        if let Some(pos) = self.account.positions.get(&intent.symbol) {
            if pos.side == intent.side && pos.leverage != intent.leverage {
                return OrderResult::Rejected {
                    reason: EngineError::LeverageMismatch {
                        order_leverage: intent.leverage,
                        position_leverage: pos.leverage,
                    }
                    .to_string(),
                };
            }
        }

        match intent.order_type {
            OrderType::Market => self.submit_market(intent, mid),
            OrderType::Limit => self.submit_limit(intent, mid),
        }
    }

    fn submit_market(&mut self, intent: OrderIntent, mid: Decimal) -> OrderResult {
        let fill = match execution::market_fill(
            intent.symbol.clone(),
            intent.side,
            intent.size_value,
            intent.size_unit,
            mid,
            self.config.taker_fee_rate,
        ) {
            Ok(fill) => fill,
            Err(e) => return OrderResult::Rejected { reason: e.to_string() },
        };

        match execution::apply_fill_to_account(&mut self.account, &fill, intent.leverage, true) {
            Ok(()) => {
                self.run_liquidation();
                OrderResult::Filled {
                    fill,
                    order_id: None,
                }
            }
            Err(e) => OrderResult::Rejected { reason: e.to_string() },
        }
    }

    fn submit_limit(&mut self, intent: OrderIntent, mid: Decimal) -> OrderResult {
        let limit_price = intent
            .limit_price
            .expect("validate_intent requires limit_price for Limit orders");
        let base = crate::numerics::convert_size(intent.size_value, intent.size_unit, mid);
        let size = match Size::try_new(base) {
            Ok(s) => s,
            Err(e) => {
                return OrderResult::Rejected {
                    reason: format!("invalid order size: {e}"),
                }
            }
        };

        let order = OpenOrder {
            order_id: OrderId::new(),
            symbol: intent.symbol.clone(),
            side: intent.side,
            size,
            limit_price,
            leverage: intent.leverage,
            reduce_only: intent.reduce_only,
            client_id: intent.client_id.clone(),
            timestamp: intent.timestamp,
        };

        if execution::limit_crosses(&order, mid, self.config.tick_size) {
            let fill = execution::limit_fill(&order, self.config.taker_fee_rate);
            match execution::apply_fill_to_account(&mut self.account, &fill, order.leverage, true) {
                Ok(()) => {
                    self.run_liquidation();
                    OrderResult::Filled {
                        fill,
                        order_id: Some(order.order_id),
                    }
                }
                Err(e) => OrderResult::Rejected { reason: e.to_string() },
            }
        } else {
            let order_id = order.order_id;
            self.account.open_orders.insert(order_id, order);
            OrderResult::Resting { order_id }
        }
    }

    /// `on_cancel`: removes a resting order if present. Never triggers
    /// liquidation.
    pub fn on_cancel(&mut self, order_id: OrderId) -> CancelResult {
        match self.account.open_orders.shift_remove(&order_id) {
            Some(_) => CancelResult::Cancelled { order_id },
            None => CancelResult::NotFound,
        }
    }

    /// A deep, immutable copy of the account suitable for serialization or
    /// transmission by an external collaborator.
    pub fn snapshot(&self) -> AccountState {
        self.account.clone()
    }

    fn run_liquidation(&mut self) {
        let events = risk::run_liquidation_loop(&mut self.account, &self.prices);
        self.liquidations_total += events.len() as u64;
    }
}

fn validate_intent(intent: &OrderIntent) -> Result<(), EngineError> {
    if intent.size_value <= Decimal::ZERO {
        return Err(EngineError::InvalidOrderIntent(
            "size_value must be positive".into(),
        ));
    }
    if intent.leverage < 1 {
        return Err(EngineError::InvalidOrderIntent(
            "leverage must be >= 1".into(),
        ));
    }
    if intent.order_type == OrderType::Limit {
        match intent.limit_price {
            Some(p) if p.as_decimal() > Decimal::ZERO => {}
            _ => {
                return Err(EngineError::InvalidOrderIntent(
                    "limit orders require a positive limit_price".into(),
                ))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_types::order::SizeUnit;
    use rust_decimal_macros::dec;

    fn intent(symbol: &str, side: Side, order_type: OrderType, size_value: Decimal, size_unit: SizeUnit, leverage: u32, limit_price: Option<Decimal>) -> OrderIntent {
        OrderIntent {
            symbol: Symbol::new(symbol),
            side,
            order_type,
            size_value,
            size_unit,
            leverage,
            limit_price: limit_price.map(|p| Price::try_new(p).unwrap()),
            reduce_only: false,
            client_id: "cid".into(),
            timestamp: 0,
        }
    }

    #[test]
    fn s1_market_buy_opens_a_position() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.on_price_update(Symbol::new("BTC"), dec!(50000));
        let result = engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Market,
            dec!(5000),
            SizeUnit::Usd,
            10,
            None,
        ));
        match result {
            OrderResult::Filled { fill, .. } => {
                assert_eq!(fill.price.as_decimal(), dec!(50000.25));
            }
            other => panic!("expected Filled, got {other:?}"),
        }
        let snap = engine.snapshot();
        let pos = snap.positions.get(&Symbol::new("BTC")).unwrap();
        assert_eq!(pos.side, Side::Buy);
        assert!(snap.balance < dec!(10000));
    }

    #[test]
    fn s2_limit_sell_rests_then_fills_on_tick() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.on_price_update(Symbol::new("BTC"), dec!(50000));
        let result = engine.on_order(intent(
            "BTC",
            Side::Sell,
            OrderType::Limit,
            dec!(0.1),
            SizeUnit::Base,
            10,
            Some(dec!(50100)),
        ));
        assert!(matches!(result, OrderResult::Resting { .. }));
        assert_eq!(engine.snapshot().open_orders.len(), 1);

        engine.on_price_update(Symbol::new("BTC"), dec!(50200));
        assert!(engine.snapshot().open_orders.is_empty());
        let snap = engine.snapshot();
        let pos = snap.positions.get(&Symbol::new("BTC")).unwrap();
        assert_eq!(pos.side, Side::Sell);
        assert_eq!(pos.size.as_decimal(), dec!(0.1));
        assert_eq!(pos.entry_price.as_decimal(), dec!(50100));
    }

    #[test]
    fn s6_same_side_leverage_mismatch_rejected() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.on_price_update(Symbol::new("BTC"), dec!(50000));
        engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Market,
            dec!(5000),
            SizeUnit::Usd,
            10,
            None,
        ));
        let before = engine.snapshot();
        let result = engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Market,
            dec!(1000),
            SizeUnit::Usd,
            20,
            None,
        ));
        match result {
            OrderResult::Rejected { reason } => assert!(reason.contains("leverage")),
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn order_without_price_is_rejected() {
        let mut engine = Engine::new(EngineConfig::default());
        let result = engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Market,
            dec!(5000),
            SizeUnit::Usd,
            10,
            None,
        ));
        match result {
            OrderResult::Rejected { reason } => assert!(reason.contains("no price")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn cancel_missing_order_is_idempotent_not_found() {
        let mut engine = Engine::new(EngineConfig::default());
        let before = engine.snapshot();
        let result = engine.on_cancel(OrderId::new());
        assert!(matches!(result, CancelResult::NotFound));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn cancel_resting_order_removes_it() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.on_price_update(Symbol::new("BTC"), dec!(50000));
        let result = engine.on_order(intent(
            "BTC",
            Side::Sell,
            OrderType::Limit,
            dec!(0.1),
            SizeUnit::Base,
            10,
            Some(dec!(50100)),
        ));
        let order_id = match result {
            OrderResult::Resting { order_id } => order_id,
            other => panic!("expected Resting, got {other:?}"),
        };
        let cancel = engine.on_cancel(order_id);
        assert!(matches!(cancel, CancelResult::Cancelled { .. }));
        assert!(engine.snapshot().open_orders.is_empty());
    }

    #[test]
    fn s5_liquidation_closes_underwater_long() {
        let mut config = EngineConfig::default();
        config.starting_balance = dec!(100);
        let mut engine = Engine::new(config);
        engine.on_price_update(Symbol::new("BTC"), dec!(50000));
        engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Market,
            dec!(0.1),
            SizeUnit::Base,
            50,
            None,
        ));
        assert!(engine.snapshot().positions.contains_key(&Symbol::new("BTC")));

        engine.on_price_update(Symbol::new("BTC"), dec!(40000));
        assert!(engine.snapshot().positions.is_empty());
        assert_eq!(engine.liquidations_total(), 1);
    }

    #[test]
    fn resting_order_with_leverage_conflict_is_dropped_silently_on_cross() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.on_price_update(Symbol::new("BTC"), dec!(50000));

        // Rests first, while there is no position yet to conflict with.
        let resting = engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Limit,
            dec!(0.1),
            SizeUnit::Base,
            20,
            Some(dec!(49900)),
        ));
        let order_id = match resting {
            OrderResult::Resting { order_id } => order_id,
            other => panic!("expected Resting, got {other:?}"),
        };

        // A same-side position opens at a different leverage — allowed,
        // since no position existed when this order was submitted.
        engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Market,
            dec!(1000),
            SizeUnit::Usd,
            10,
            None,
        ));
        let before = engine.snapshot();
        assert!(before.open_orders.contains_key(&order_id));

        // Price drops far enough for the resting order to cross; applying
        // its fill now conflicts with the position's leverage (10 vs 20),
        // so the fill is rejected internally and the order is dropped
        // silently rather than surfaced as a rejection — there is no
        // caller left to reject it to.
        engine.on_price_update(Symbol::new("BTC"), dec!(49800));

        let after = engine.snapshot();
        assert!(!after.open_orders.contains_key(&order_id));
        assert!(after.open_orders.is_empty());
        // Position and balance are exactly as they were before the tick —
        // the dropped fill never touched account state.
        assert_eq!(after.positions, before.positions);
        assert_eq!(after.balance, before.balance);
    }

    #[test]
    fn zero_size_intent_is_rejected_without_panicking() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.on_price_update(Symbol::new("BTC"), dec!(50000));
        let result = engine.on_order(intent(
            "BTC",
            Side::Buy,
            OrderType::Market,
            dec!(0),
            SizeUnit::Usd,
            10,
            None,
        ));
        assert!(matches!(result, OrderResult::Rejected { .. }));
    }
}
