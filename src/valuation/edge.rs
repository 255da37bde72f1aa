use serde::{Deserialize, Serialize};
use std::fmt;

use super::cost::{estimate_outcome_cost, CostBreakdown};
use crate::config::ThresholdConfig;
use crate::types::Outcome;

/// Spread assumed by the spread gate when the book spread is unknown
pub const DEFAULT_EFFECTIVE_SPREAD: f64 = 0.01;

/// A recommendation gate that did not pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateFailure {
    /// Net EV below `ev_min`
    Ev,
    /// Liquidity below `liq_min`, or unknown
    Liquidity,
    /// Effective spread above `spread_max`
    Spread,
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFailure::Ev => write!(f, "ev_below_min"),
            GateFailure::Liquidity => write!(f, "insufficient_liquidity"),
            GateFailure::Spread => write!(f, "excessive_spread"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Recommend,
    Pass(Vec<GateFailure>),
}

impl Decision {
    pub fn is_recommend(&self) -> bool {
        matches!(self, Decision::Recommend)
    }

    pub fn failures(&self) -> &[GateFailure] {
        match self {
            Decision::Recommend => &[],
            Decision::Pass(reasons) => reasons,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Recommend => write!(f, "RECOMMEND"),
            Decision::Pass(reasons) => {
                let reasons: Vec<String> = reasons.iter().map(|r| r.to_string()).collect();
                write!(f, "PASS ({})", reasons.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeQuote {
    pub p_fair: f64,
    pub p_market: f64,
    pub edge: f64,
    pub cost: CostBreakdown,
    pub net_ev: f64,
    /// Edge per unit staked (edge / price), 0 when the price is 0
    pub return_on_stake: f64,
    pub decision: Decision,
}

/// Gate evaluation over independent checks; every failing gate is reported.
pub fn gate_decision(
    net_ev: f64,
    liquidity: Option<f64>,
    spread: Option<f64>,
    thresholds: &ThresholdConfig,
) -> Decision {
    let mut failed = Vec::new();

    if !liquidity.map_or(false, |l| l >= thresholds.liq_min) {
        failed.push(GateFailure::Liquidity);
    }

    let effective_spread = spread.unwrap_or(DEFAULT_EFFECTIVE_SPREAD);
    if effective_spread > thresholds.spread_max {
        failed.push(GateFailure::Spread);
    }

    if !(net_ev >= thresholds.ev_min) {
        failed.push(GateFailure::Ev);
    }

    if failed.is_empty() {
        Decision::Recommend
    } else {
        Decision::Pass(failed)
    }
}

pub fn evaluate_edge(
    p_fair: f64,
    outcome: &Outcome,
    liquidity: Option<f64>,
    thresholds: &ThresholdConfig,
) -> EdgeQuote {
    let p_market = outcome.price;
    let cost = estimate_outcome_cost(outcome, liquidity);

    let edge = p_fair - p_market;
    let net_ev = edge - cost.total();
    let return_on_stake = if p_market > 0.0 { edge / p_market } else { 0.0 };

    EdgeQuote {
        p_fair,
        p_market,
        edge,
        cost,
        net_ev,
        return_on_stake,
        decision: gate_decision(net_ev, liquidity, outcome.spread, thresholds),
    }
}
