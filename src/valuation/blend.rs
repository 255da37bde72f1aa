//! Fair-probability blending
//!
//! Combines the quoted market price with the order-book mid and an external
//! reference using fixed weights. The tier records which sources were
//! present and drives the reported confidence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::probability::normalize_probs;
use crate::types::ProbMap;

/// Which evidence sources went into a blend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendTier {
    MarketOnly,
    MarketMid,
    MarketReference,
    Full,
}

impl BlendTier {
    fn from_sources(has_mid: bool, has_reference: bool) -> Self {
        match (has_mid, has_reference) {
            (false, false) => BlendTier::MarketOnly,
            (true, false) => BlendTier::MarketMid,
            (false, true) => BlendTier::MarketReference,
            (true, true) => BlendTier::Full,
        }
    }

    /// (reference, mid, market) weights
    pub fn weights(&self) -> (f64, f64, f64) {
        match self {
            BlendTier::MarketOnly => (0.0, 0.0, 1.0),
            BlendTier::MarketMid => (0.0, 0.6, 0.4),
            BlendTier::MarketReference => (0.7, 0.0, 0.3),
            BlendTier::Full => (0.5, 0.3, 0.2),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BlendTier::MarketOnly => "no external reference",
            BlendTier::MarketMid => "blended 60% order-book mid / 40% market",
            BlendTier::MarketReference => "blended 70% reference / 30% market",
            BlendTier::Full => "blended 50% reference / 30% mid / 20% market",
        }
    }

    pub fn has_reference(&self) -> bool {
        matches!(self, BlendTier::MarketReference | BlendTier::Full)
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            BlendTier::MarketOnly | BlendTier::MarketMid => Confidence::Low,
            BlendTier::MarketReference => Confidence::Medium,
            BlendTier::Full => Confidence::High,
        }
    }
}

impl fmt::Display for BlendTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Displayed confidence level of a fair-probability estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// One step lower, saturating at `Low`
    pub fn downgrade(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Blended fair distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairEstimate {
    pub probs: ProbMap,
    pub tier: BlendTier,
}

impl FairEstimate {
    pub fn label(&self) -> &'static str {
        self.tier.label()
    }

    pub fn prob(&self, name: &str) -> Option<f64> {
        self.probs.get(name).copied()
    }
}

/// Blend market prices with optional mids and reference probabilities.
///
/// An empty mid or reference map counts as absent. Within a present source,
/// an outcome it does not cover uses the market price instead.
pub fn blend_fair_probs(
    market: &ProbMap,
    mid: Option<&ProbMap>,
    reference: Option<&ProbMap>,
) -> FairEstimate {
    let mid = mid.filter(|m| !m.is_empty());
    let reference = reference.filter(|r| !r.is_empty());
    let tier = BlendTier::from_sources(mid.is_some(), reference.is_some());
    let (w_ref, w_mid, w_mkt) = tier.weights();

    let names: BTreeSet<&String> = market
        .keys()
        .chain(mid.into_iter().flat_map(|m| m.keys()))
        .chain(reference.into_iter().flat_map(|r| r.keys()))
        .collect();

    let raw: ProbMap = names
        .into_iter()
        .map(|name| {
            let mid_p = mid.and_then(|m| m.get(name)).copied();
            let ref_p = reference.and_then(|r| r.get(name)).copied();
            // An outcome the venue does not quote borrows whichever estimate exists
            let mkt_p = market
                .get(name)
                .copied()
                .or(mid_p)
                .or(ref_p)
                .unwrap_or(0.0);

            let blended = w_ref * ref_p.unwrap_or(mkt_p)
                + w_mid * mid_p.unwrap_or(mkt_p)
                + w_mkt * mkt_p;
            (name.clone(), blended)
        })
        .collect();

    FairEstimate {
        probs: normalize_probs(&raw),
        tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::probability::sum;

    fn map(items: &[(&str, f64)]) -> ProbMap {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_market_only_is_normalized_market() {
        let market = map(&[("Yes", 0.55), ("No", 0.50)]);
        let fair = blend_fair_probs(&market, None, None);

        assert_eq!(fair.tier, BlendTier::MarketOnly);
        assert_eq!(fair.label(), "no external reference");
        assert_eq!(fair.tier.confidence(), Confidence::Low);
        assert!((fair.probs["Yes"] - 0.55 / 1.05).abs() < 1e-12);
        assert!((sum(&fair.probs) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_shifts_by_seventy_thirty() {
        let market = map(&[("A", 0.5), ("B", 0.5)]);
        let reference = map(&[("A", 0.7), ("B", 0.3)]);

        let fair = blend_fair_probs(&market, None, Some(&reference));

        assert_eq!(fair.tier, BlendTier::MarketReference);
        assert_ne!(fair.label(), "no external reference");
        // 0.7 * 0.7 + 0.3 * 0.5 = 0.64
        assert!((fair.probs["A"] - 0.64).abs() < 1e-12);
        assert!((fair.probs["B"] - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_mid_only_weighting() {
        let market = map(&[("A", 0.5), ("B", 0.5)]);
        let mid = map(&[("A", 0.6), ("B", 0.4)]);

        let fair = blend_fair_probs(&market, Some(&mid), None);

        assert_eq!(fair.tier, BlendTier::MarketMid);
        assert_eq!(fair.tier.confidence(), Confidence::Low);
        // 0.6 * 0.6 + 0.4 * 0.5 = 0.56
        assert!((fair.probs["A"] - 0.56).abs() < 1e-12);
    }

    #[test]
    fn test_full_blend_weighting() {
        let market = map(&[("A", 0.5), ("B", 0.5)]);
        let mid = map(&[("A", 0.6), ("B", 0.4)]);
        let reference = map(&[("A", 0.8), ("B", 0.2)]);

        let fair = blend_fair_probs(&market, Some(&mid), Some(&reference));

        assert_eq!(fair.tier, BlendTier::Full);
        assert_eq!(fair.tier.confidence(), Confidence::High);
        // 0.5 * 0.8 + 0.3 * 0.6 + 0.2 * 0.5 = 0.68
        assert!((fair.probs["A"] - 0.68).abs() < 1e-12);
        assert!((sum(&fair.probs) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_reference_entry_falls_back_to_market() {
        let market = map(&[("Home", 0.5), ("Draw", 0.25), ("Away", 0.25)]);
        let reference = map(&[("Home", 0.6)]);

        let fair = blend_fair_probs(&market, None, Some(&reference));

        // Home: 0.7*0.6 + 0.3*0.5 = 0.57; Draw/Away keep 0.25 each
        let total = 0.57 + 0.25 + 0.25;
        assert!((fair.probs["Home"] - 0.57 / total).abs() < 1e-12);
        assert!((fair.probs["Draw"] - 0.25 / total).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sources_count_as_absent() {
        let market = map(&[("A", 0.4), ("B", 0.6)]);
        let fair = blend_fair_probs(&market, Some(&ProbMap::new()), Some(&ProbMap::new()));
        assert_eq!(fair.tier, BlendTier::MarketOnly);
    }

    #[test]
    fn test_output_domain_is_union_of_sources() {
        let market = map(&[("A", 0.5)]);
        let reference = map(&[("A", 0.5), ("B", 0.5)]);

        let fair = blend_fair_probs(&market, None, Some(&reference));
        assert_eq!(fair.probs.len(), 2);
        assert!((sum(&fair.probs) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_downgrade_saturates() {
        assert_eq!(Confidence::High.downgrade(), Confidence::Medium);
        assert_eq!(Confidence::Low.downgrade(), Confidence::Low);
    }
}
