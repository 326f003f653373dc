//! Market/limit execution and applying a `Fill` to the account.

use crate::numerics;
use paper_types::account::AccountState;
use paper_types::errors::EngineError;
use paper_types::fill::Fill;
use paper_types::ids::Symbol;
use paper_types::numeric::{Price, Size};
use paper_types::order::{OpenOrder, Side, SizeUnit};
use paper_types::position::Position;
use rust_decimal::Decimal;

/// Computes the market-order `Fill` for an intent against a reference mid,
/// per the resolved exec-price/size algorithm. Does not touch account state.
pub fn market_fill(
    symbol: Symbol,
    side: Side,
    size_value: Decimal,
    size_unit: SizeUnit,
    mid: Decimal,
    fee_rate: Decimal,
) -> Result<Fill, EngineError> {
    let exec_price = numerics::exec_price(mid, side, size_value, size_unit);
    // Sized at the exec price, not the mid — the one asymmetry against the
    // limit path, preserved intentionally.
    let base = numerics::convert_size(size_value, size_unit, exec_price);
    let notional = base * exec_price;
    let fee = numerics::fee(notional, fee_rate);

    let size = Size::try_new(base)
        .map_err(|e| EngineError::InvalidOrderIntent(format!("non-positive fill size: {e}")))?;
    let price = Price::try_new(exec_price)
        .map_err(|e| EngineError::InvalidOrderIntent(format!("non-positive exec price: {e}")))?;

    Ok(Fill {
        symbol,
        side,
        size,
        price,
        fee,
        order_id: None,
    })
}

/// `bid = mid - tick/2`, `ask = mid + tick/2`. A Buy crosses iff `ask <=
/// limit_price`; a Sell crosses iff `bid >= limit_price`.
pub fn limit_crosses(order: &OpenOrder, mid: Decimal, tick_size: Decimal) -> bool {
    let half = tick_size / Decimal::from(2u32);
    let bid = mid - half;
    let ask = mid + half;
    match order.side {
        Side::Buy => ask <= order.limit_price.as_decimal(),
        Side::Sell => bid >= order.limit_price.as_decimal(),
    }
}

/// The `Fill` a crossing limit order produces: at the limit price, in full,
/// fee charged at the taker rate (limit fills use the same rate as market
/// fills in this simulator).
pub fn limit_fill(order: &OpenOrder, fee_rate: Decimal) -> Fill {
    let notional = order.size.as_decimal() * order.limit_price.as_decimal();
    let fee = numerics::fee(notional, fee_rate);
    Fill {
        symbol: order.symbol.clone(),
        side: order.side,
        size: order.size,
        price: order.limit_price,
        fee,
        order_id: Some(order.order_id),
    }
}

/// Applies `fill` to the account under `order_leverage`, performing the
/// open/same-side-increase/reduce/close/flip state transition. `fee` is
/// taken from the fill unless `charge_fee` is false (liquidation closes).
pub fn apply_fill_to_account(
    account: &mut AccountState,
    fill: &Fill,
    order_leverage: u32,
    charge_fee: bool,
) -> Result<(), EngineError> {
    let fee = if charge_fee { fill.fee } else { Decimal::ZERO };

    match account.positions.get(&fill.symbol) {
        None => {
            let pos = Position::new(
                fill.symbol.clone(),
                fill.side,
                fill.size,
                fill.price,
                order_leverage,
            );
            account.positions.insert(fill.symbol.clone(), pos);
            account.balance -= fee;
        }
        Some(pos) if pos.side == fill.side => {
            if order_leverage != pos.leverage {
                return Err(EngineError::LeverageMismatch {
                    order_leverage,
                    position_leverage: pos.leverage,
                });
            }
            let new_size = pos.size.as_decimal() + fill.size.as_decimal();
            let new_entry = (pos.size.as_decimal() * pos.entry_price.as_decimal()
                + fill.size.as_decimal() * fill.price.as_decimal())
                / new_size;

            let pos = account.positions.get_mut(&fill.symbol).expect("checked above");
            pos.size = Size::try_new(new_size).expect("sum of two positive sizes is positive");
            pos.entry_price =
                Price::try_new(new_entry).expect("volume-weighted average of positive prices is positive");
            account.balance -= fee;
        }
        Some(pos) => {
            let pos_side = pos.side;
            let pos_entry = pos.entry_price.as_decimal();
            let pos_size = pos.size.as_decimal();
            let fill_size = fill.size.as_decimal();

            if fill_size < pos_size {
                // Reduce: entry unchanged, size shrinks.
                let rpnl = numerics::rpnl(pos_side, pos_entry, fill.price.as_decimal(), fill_size);
                let pos = account.positions.get_mut(&fill.symbol).expect("checked above");
                pos.size = Size::try_new(pos_size - fill_size).expect("reduce leaves positive remainder");
                account.balance += rpnl - fee;
            } else if fill_size == pos_size {
                // Close.
                let rpnl = numerics::rpnl(pos_side, pos_entry, fill.price.as_decimal(), pos_size);
                account.positions.shift_remove(&fill.symbol);
                account.balance += rpnl - fee;
            } else {
                // Flip: close the old side, open a fresh position on the fill's side.
                let rpnl = numerics::rpnl(pos_side, pos_entry, fill.price.as_decimal(), pos_size);
                account.balance += rpnl - fee;
                let remainder =
                    Size::try_new(fill_size - pos_size).expect("flip remainder is positive by construction");
                let new_pos = Position::new(
                    fill.symbol.clone(),
                    fill.side,
                    remainder,
                    fill.price,
                    order_leverage,
                );
                account.positions.insert(fill.symbol.clone(), new_pos);
            }
        }
    }

    Ok(())
}
