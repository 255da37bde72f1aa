//! Market valuation: fair probabilities, costs, edges and sizing.

pub mod blend;
pub mod classifier;
pub mod cost;
pub mod edge;
pub mod engine;
pub mod kelly;
pub mod probability;
pub mod quality;
pub mod reference;

pub use blend::{blend_fair_probs, BlendTier, Confidence, FairEstimate};
pub use classifier::{classify_market, MarketKind};
pub use cost::{estimate_outcome_cost, slippage_for_liquidity, CostBreakdown};
pub use edge::{evaluate_edge, gate_decision, Decision, EdgeQuote, GateFailure};
pub use engine::{
    leg_name, EventLeg, EventValuation, MarketValuation, OutcomeValuation, ValuationEngine,
};
pub use kelly::{compute_fractional_kelly, fractional_kelly_fraction, KellyQuote};
pub use probability::{devig_decimal_odds, normalize_probs};
pub use quality::{grade_market, QualityGrade};
pub use reference::{align_to_outcomes, match_reference, ReferenceOdds, ReferenceSource};
