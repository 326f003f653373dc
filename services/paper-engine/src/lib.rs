//! Deterministic matching and risk engine for the paper-trading simulator.
//!
//! The engine is a synchronous, single-writer state machine: no method here
//! performs I/O or suspends, and every call returns a result record after
//! running any fill application and liquidation to completion. Everything
//! that talks to the outside world — the HTTP/WS façade, the price-feed
//! client, persistence — is an external collaborator that drives this
//! engine through [`Engine::on_price_update`], [`Engine::on_order`],
//! [`Engine::on_cancel`], and [`Engine::snapshot`].

pub mod config;
pub mod events;
pub mod execution;
pub mod numerics;
pub mod risk;
pub mod state;

pub use config::EngineConfig;
pub use events::{CancelResult, OrderResult};
pub use state::Engine;
