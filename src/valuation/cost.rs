//! Transaction cost heuristic
//!
//! Costs are expressed in probability points lost against the quoted mid:
//! half the spread, the venue fee, and a liquidity-bucketed slippage term.

use serde::{Deserialize, Serialize};

use crate::types::Outcome;

/// Spread cost used when the book spread is unknown
pub const DEFAULT_SPREAD_COST: f64 = 0.01;
/// Slippage used when market liquidity is unknown
pub const UNKNOWN_LIQUIDITY_SLIPPAGE: f64 = 0.02;

/// Liquidity buckets: (upper bound exclusive, slippage)
const SLIPPAGE_BUCKETS: [(f64, f64); 2] = [(2_000.0, 0.03), (10_000.0, 0.015)];
const DEEP_BOOK_SLIPPAGE: f64 = 0.0075;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub spread: f64,
    pub fee: f64,
    pub slippage: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.spread + self.fee + self.slippage
    }
}

/// Slippage estimate from snapshot liquidity. Never decreases as liquidity falls.
pub fn slippage_for_liquidity(liquidity: Option<f64>) -> f64 {
    let Some(liq) = liquidity.filter(|l| l.is_finite()) else {
        return UNKNOWN_LIQUIDITY_SLIPPAGE;
    };

    SLIPPAGE_BUCKETS
        .iter()
        .find(|(upper, _)| liq < *upper)
        .map(|(_, slip)| *slip)
        .unwrap_or(DEEP_BOOK_SLIPPAGE)
}

pub fn fee_rate_from_bps(fee_rate_bps: Option<f64>) -> f64 {
    fee_rate_bps
        .filter(|bps| bps.is_finite())
        .map(|bps| bps.max(0.0) / 10_000.0)
        .unwrap_or(0.0)
}

pub fn estimate_outcome_cost(outcome: &Outcome, liquidity: Option<f64>) -> CostBreakdown {
    let spread = outcome
        .spread
        .map(|s| s.max(0.0) / 2.0)
        .unwrap_or(DEFAULT_SPREAD_COST);

    CostBreakdown {
        spread,
        fee: fee_rate_from_bps(outcome.fee_rate_bps),
        slippage: slippage_for_liquidity(liquidity),
    }
}
