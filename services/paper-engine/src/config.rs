//! Engine tunables.
//!
//! `SNAPSHOT_INTERVAL_S` from the boundary contract belongs to the external
//! snapshotter's cadence, not the engine, and has no field here.

use rust_decimal::Decimal;

/// The handful of tunables the engine reads. Everything else (HTTP port,
/// DB path, snapshot cadence) belongs to an external collaborator's own
/// configuration, not this crate's.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Half-spread around mid for the limit-cross test; also the rounding step.
    pub tick_size: Decimal,
    /// Fee rate applied to every fill, market and limit alike.
    pub taker_fee_rate: Decimal,
    /// Carried for completeness; unused by any fill path in this simulator.
    pub maker_fee_rate: Decimal,
    /// Default leverage for callers that don't specify one explicitly.
    pub default_leverage: u32,
    pub starting_balance: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_size: Decimal::new(1, 1),
            taker_fee_rate: Decimal::new(45, 5),
            maker_fee_rate: Decimal::new(15, 5),
            default_leverage: 10,
            starting_balance: Decimal::new(10_000, 0),
        }
    }
}
