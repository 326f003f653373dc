//! Pure numeric functions: PnL, margin, slippage, fees, rounding.
//!
//! Every function here is total and side-effect free; all monetary values
//! are plain `Decimal` rather than the validated `Price`/`Size` newtypes, so
//! intermediate results (which may legitimately be zero, negative, or an
//! unvalidated ratio) don't need to pass through a constructor that would
//! reject them.

use paper_types::order::Side;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// `sign(side) * size * (mark - entry)`.
pub fn upnl(side: Side, size: Decimal, mark: Decimal, entry: Decimal) -> Decimal {
    Decimal::from(side.sign()) * size * (mark - entry)
}

/// `size * price / (2 * leverage)`.
pub fn maintenance_margin(size: Decimal, price: Decimal, leverage: u32) -> Decimal {
    size * price / (Decimal::from(2u32) * Decimal::from(leverage))
}

/// `is_liquidatable` iff there are positions and equity is *strictly* below
/// total maintenance margin — equity equal to MM is still solvent.
pub fn is_liquidatable(equity: Decimal, total_mm: Decimal, has_positions: bool) -> bool {
    has_positions && equity < total_mm
}

/// `(notional / 100_000) * 0.0001`.
pub fn slippage(notional: Decimal) -> Decimal {
    (notional / Decimal::from(100_000u32)) * Decimal::new(1, 4)
}

/// `Buy -> p*(1+s)`, `Sell -> p*(1-s)`.
pub fn apply_slippage(price: Decimal, side: Side, s: Decimal) -> Decimal {
    match side {
        Side::Buy => price * (Decimal::ONE + s),
        Side::Sell => price * (Decimal::ONE - s),
    }
}

/// `notional * rate`.
pub fn fee(notional: Decimal, rate: Decimal) -> Decimal {
    notional * rate
}

/// `Usd -> value / price`, `Base -> value` unchanged.
pub fn convert_size(value: Decimal, unit: paper_types::order::SizeUnit, price: Decimal) -> Decimal {
    use paper_types::order::SizeUnit;
    match unit {
        SizeUnit::Usd => value / price,
        SizeUnit::Base => value,
    }
}

/// Resolves the circular size/slippage dependency by sizing at the mid
/// price first, then applying slippage computed from that sizing.
pub fn exec_price(
    mid: Decimal,
    side: Side,
    size_value: Decimal,
    size_unit: paper_types::order::SizeUnit,
) -> Decimal {
    let base = convert_size(size_value, size_unit, mid);
    let s = slippage(base * mid);
    apply_slippage(mid, side, s)
}

/// `sign(side) * (exit - entry) * closed_size`. `side` is the *position's*
/// side being reduced, not the fill's side.
pub fn rpnl(side: Side, entry: Decimal, exit: Decimal, closed_size: Decimal) -> Decimal {
    Decimal::from(side.sign()) * (exit - entry) * closed_size
}

/// UI-only estimate of the price at which a position would be liquidated
/// in isolation. `None` if `size <= 0` or the formula yields a
/// non-positive number.
pub fn liquidation_price(
    side: Side,
    entry: Decimal,
    balance: Decimal,
    size: Decimal,
    mmr: Decimal,
) -> Option<Decimal> {
    if size <= Decimal::ZERO {
        return None;
    }
    let price = match side {
        Side::Buy => (entry - balance / size) / (Decimal::ONE - mmr),
        Side::Sell => (balance / size + entry) / (Decimal::ONE + mmr),
    };
    if price > Decimal::ZERO {
        Some(price)
    } else {
        None
    }
}

/// `round(x/step) * step`, half-away-from-zero. `step <= 0` passes `x` through.
pub fn round_to(x: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return x;
    }
    (x / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * step
}
