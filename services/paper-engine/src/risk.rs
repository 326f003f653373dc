//! Iterative cross-margin liquidation loop.

use crate::numerics;
use paper_types::account::AccountState;
use paper_types::ids::Symbol;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One position closed by the liquidation loop, for observability only —
/// never influences control flow.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidationEvent {
    pub symbol: Symbol,
    pub size: Decimal,
    pub mark: Decimal,
    pub rpnl: Decimal,
}

/// Runs the worst-position-first liquidation loop to a solvent fixed point.
///
/// Per iteration: compute equity and total maintenance margin against
/// current marks (falling back to a position's own entry price if no mark
/// has ever been received for its symbol); if the account is liquidatable,
/// close the position with the most negative unrealized PnL — ties broken
/// by the positions map's iteration order, which `IndexMap` makes
/// insertion-ordered and therefore deterministic — at its mark, crediting
/// realized PnL with **no fee**. Terminates because the position count
/// strictly decreases every iteration; a no-op on an account with no
/// positions regardless of balance.
pub fn run_liquidation_loop(
    account: &mut AccountState,
    marks: &HashMap<Symbol, Decimal>,
) -> Vec<LiquidationEvent> {
    let mut events = Vec::new();

    loop {
        if account.positions.is_empty() {
            break;
        }

        let mut total_upnl = Decimal::ZERO;
        let mut total_mm = Decimal::ZERO;
        let mut worst: Option<(Symbol, Decimal, Decimal)> = None; // (symbol, upnl, mark)

        for (symbol, pos) in account.positions.iter() {
            let mark = marks
                .get(symbol)
                .copied()
                .unwrap_or(pos.entry_price.as_decimal());
            let pos_upnl = numerics::upnl(pos.side, pos.size.as_decimal(), mark, pos.entry_price.as_decimal());
            let pos_mm = numerics::maintenance_margin(pos.size.as_decimal(), mark, pos.leverage);

            total_upnl += pos_upnl;
            total_mm += pos_mm;

            let is_worse = match &worst {
                None => true,
                Some((_, worst_upnl, _)) => pos_upnl < *worst_upnl,
            };
            if is_worse {
                worst = Some((symbol.clone(), pos_upnl, mark));
            }
        }

        let equity = account.balance + total_upnl;
        if !numerics::is_liquidatable(equity, total_mm, true) {
            break;
        }

        let (symbol, _, mark) = worst.expect("positions non-empty");
        let pos = account
            .positions
            .get(&symbol)
            .expect("symbol taken from this account's own map");
        let rpnl = numerics::rpnl(pos.side, pos.entry_price.as_decimal(), mark, pos.size.as_decimal());
        let size = pos.size.as_decimal();

        account.balance += rpnl;
        account.positions.shift_remove(&symbol);

        tracing::warn!(symbol = %symbol, %size, %mark, %rpnl, "position liquidated");
        events.push(LiquidationEvent {
            symbol,
            size,
            mark,
            rpnl,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_types::numeric::{Price, Size};
    use paper_types::order::Side;
    use paper_types::position::Position;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_account_is_never_liquidated_even_with_negative_balance() {
        let mut acct = AccountState::new(dec!(-500));
        let events = run_liquidation_loop(&mut acct, &HashMap::new());
        assert!(events.is_empty());
        assert_eq!(acct.balance, dec!(-500));
    }

    #[test]
    fn solvent_account_is_left_untouched() {
        let mut acct = AccountState::new(dec!(10000));
        acct.positions.insert(
            Symbol::new("BTC"),
            Position::new(
                Symbol::new("BTC"),
                Side::Buy,
                Size::try_new(dec!(0.1)).unwrap(),
                Price::try_new(dec!(50000)).unwrap(),
                10,
            ),
        );
        let mut marks = HashMap::new();
        marks.insert(Symbol::new("BTC"), dec!(50500));
        let events = run_liquidation_loop(&mut acct, &marks);
        assert!(events.is_empty());
        assert!(acct.positions.contains_key(&Symbol::new("BTC")));
    }

    #[test]
    fn underwater_long_gets_closed_no_fee_s5() {
        let mut acct = AccountState::new(dec!(100));
        acct.positions.insert(
            Symbol::new("BTC"),
            Position::new(
                Symbol::new("BTC"),
                Side::Buy,
                Size::try_new(dec!(0.1)).unwrap(),
                Price::try_new(dec!(50000)).unwrap(),
                50,
            ),
        );
        let mut marks = HashMap::new();
        marks.insert(Symbol::new("BTC"), dec!(40000));
        let events = run_liquidation_loop(&mut acct, &marks);
        assert_eq!(events.len(), 1);
        assert!(acct.positions.is_empty());
        // rpnl = +1 * (40000-50000) * 0.1 = -1000, no fee subtracted.
        assert_eq!(acct.balance, dec!(100) - dec!(1000));
    }

    #[test]
    fn worst_position_picked_first_on_tie_break_by_insertion_order() {
        let mut acct = AccountState::new(dec!(10));
        acct.positions.insert(
            Symbol::new("AAA"),
            Position::new(
                Symbol::new("AAA"),
                Side::Buy,
                Size::try_new(dec!(1)).unwrap(),
                Price::try_new(dec!(100)).unwrap(),
                50,
            ),
        );
        acct.positions.insert(
            Symbol::new("BBB"),
            Position::new(
                Symbol::new("BBB"),
                Side::Buy,
                Size::try_new(dec!(1)).unwrap(),
                Price::try_new(dec!(100)).unwrap(),
                50,
            ),
        );
        let mut marks = HashMap::new();
        marks.insert(Symbol::new("AAA"), dec!(50));
        marks.insert(Symbol::new("BBB"), dec!(50));
        let events = run_liquidation_loop(&mut acct, &marks);
        assert_eq!(events[0].symbol, Symbol::new("AAA"));
    }
}
