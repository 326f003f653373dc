//! Error taxonomy for the matching and risk engine.

use thiserror::Error;

/// Reasons an `OrderIntent` can be rejected or fail validation before it
/// ever reaches engine state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No price tick has ever been received for this symbol.
    #[error("no price available for {symbol}")]
    NoPrice { symbol: String },

    /// A same-side order's leverage does not match the existing position's.
    #[error("leverage mismatch: order leverage {order_leverage} != position leverage {position_leverage}")]
    LeverageMismatch {
        order_leverage: u32,
        position_leverage: u32,
    },

    /// The intent is malformed in a way a boundary layer would normally
    /// reject before the engine sees it (zero/negative size, non-positive
    /// limit price, leverage below 1). The engine still guards against it
    /// since nothing upstream of this crate does so in-process.
    #[error("invalid order intent: {0}")]
    InvalidOrderIntent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_price_display() {
        let err = EngineError::NoPrice {
            symbol: "BTC".into(),
        };
        assert_eq!(err.to_string(), "no price available for BTC");
    }

    #[test]
    fn leverage_mismatch_display_mentions_leverage() {
        let err = EngineError::LeverageMismatch {
            order_leverage: 20,
            position_leverage: 10,
        };
        assert!(err.to_string().contains("leverage"));
    }
}
