//! Probability normalisation and bookmaker de-vig

use crate::types::ProbMap;

/// Rescale non-negative weights into a distribution.
///
/// Negative weights count as zero. When nothing positive remains every
/// outcome maps to 0.0, which callers must read as "no usable signal".
pub fn normalize_probs(weights: &ProbMap) -> ProbMap {
    let total: f64 = weights.values().map(|w| w.max(0.0)).sum();

    if total <= 0.0 || !total.is_finite() {
        return weights.keys().map(|k| (k.clone(), 0.0)).collect();
    }

    weights
        .iter()
        .map(|(k, w)| (k.clone(), w.max(0.0) / total))
        .collect()
}

/// Convert decimal odds into margin-free implied probabilities.
///
/// Odds of 1.0 or below are dropped from the output entirely.
pub fn devig_decimal_odds(odds: &ProbMap) -> ProbMap {
    let inverse: ProbMap = odds
        .iter()
        .filter(|(_, o)| o.is_finite() && **o > 1.0)
        .map(|(k, o)| (k.clone(), 1.0 / o))
        .collect();
    normalize_probs(&inverse)
}

/// Bookmaker margin implied by a set of decimal odds (sum of inverses - 1)
pub fn odds_overround(odds: &ProbMap) -> f64 {
    let implied: f64 = odds
        .values()
        .filter(|o| o.is_finite() && **o > 1.0)
        .map(|o| 1.0 / o)
        .sum();
    if implied > 0.0 {
        implied - 1.0
    } else {
        0.0
    }
}

pub fn sum(probs: &ProbMap) -> f64 {
    probs.values().sum()
}
