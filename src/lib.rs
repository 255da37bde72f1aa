//! PolyBet Library
//!
//! Valuation engine for Polymarket sports markets: fair probabilities,
//! transaction costs, edge gating and fractional-Kelly sizing.

pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod risk;
pub mod types;
pub mod valuation;

pub use config::Settings;
pub use error::{PolybetError, Result};
pub use valuation::{MarketValuation, ValuationEngine};
