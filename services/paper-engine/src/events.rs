//! Result records returned synchronously by the engine's event handlers.

use paper_types::fill::Fill;
use paper_types::ids::OrderId;

/// Outcome of submitting an `OrderIntent`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderResult {
    Filled {
        fill: Fill,
        order_id: Option<OrderId>,
    },
    Resting {
        order_id: OrderId,
    },
    Rejected {
        reason: String,
    },
}

/// Outcome of a cancel request.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelResult {
    Cancelled { order_id: OrderId },
    NotFound,
}
