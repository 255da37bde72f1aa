//! External reference odds (user-entered or bookmaker) and label matching

use serde::{Deserialize, Serialize};
use std::fmt;

use super::probability::{devig_decimal_odds, normalize_probs};
use crate::types::ProbMap;

/// Where reference odds came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceSource {
    /// Typed in by the user
    User,
    /// A single named bookmaker
    Bookmaker(String),
    /// Average of several bookmakers
    Consensus { books: usize },
}

impl fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSource::User => write!(f, "user"),
            ReferenceSource::Bookmaker(name) => write!(f, "{}", name),
            ReferenceSource::Consensus { books } => write!(f, "consensus of {} books", books),
        }
    }
}

/// Outcome label -> decimal odds from a source outside the venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceOdds {
    pub source: ReferenceSource,
    pub odds: ProbMap,
}

impl ReferenceOdds {
    pub fn new(source: ReferenceSource, odds: ProbMap) -> Self {
        Self { source, odds }
    }

    pub fn user(odds: ProbMap) -> Self {
        Self::new(ReferenceSource::User, odds)
    }

    /// True when no entry carries usable odds
    pub fn is_empty(&self) -> bool {
        !self.odds.values().any(|o| o.is_finite() && *o > 1.0)
    }

    /// De-vigged probabilities over the outcomes with valid odds
    pub fn probabilities(&self) -> ProbMap {
        devig_decimal_odds(&self.odds)
    }

    /// Average the de-vigged books per outcome label and express the result
    /// as fair decimal odds. Returns `None` when no book has usable odds.
    pub fn consensus(books: &[ReferenceOdds]) -> Option<ReferenceOdds> {
        let usable: Vec<ProbMap> = books
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.probabilities())
            .collect();
        if usable.is_empty() {
            return None;
        }

        let mut totals = ProbMap::new();
        let mut counts = std::collections::BTreeMap::<String, usize>::new();
        for probs in &usable {
            for (name, p) in probs {
                *totals.entry(name.clone()).or_insert(0.0) += p;
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }

        let averaged: ProbMap = totals
            .into_iter()
            .map(|(name, total)| {
                let n = counts.get(&name).copied().unwrap_or(1) as f64;
                (name, total / n)
            })
            .collect();

        let odds: ProbMap = normalize_probs(&averaged)
            .into_iter()
            .filter(|(_, p)| *p > 0.0)
            .map(|(name, p)| (name, 1.0 / p))
            .collect();

        Some(ReferenceOdds::new(
            ReferenceSource::Consensus {
                books: usable.len(),
            },
            odds,
        ))
    }
}

/// Find the reference probability for an outcome label.
///
/// Exact case-insensitive equality wins; otherwise the first label (in map
/// order) where either string contains the other.
pub fn match_reference(name: &str, reference: &ProbMap) -> Option<f64> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let labels: Vec<(String, f64)> = reference
        .iter()
        .map(|(k, p)| (k.trim().to_lowercase(), *p))
        .filter(|(k, _)| !k.is_empty())
        .collect();

    labels
        .iter()
        .find(|(k, _)| *k == needle)
        .or_else(|| {
            labels
                .iter()
                .find(|(k, _)| k.contains(&needle) || needle.contains(k.as_str()))
        })
        .map(|(_, p)| *p)
}

/// Re-key reference probabilities onto the given outcome names. Outcomes
/// without a match are left out so the blend falls back to market price.
pub fn align_to_outcomes<'a>(
    names: impl IntoIterator<Item = &'a str>,
    reference: &ProbMap,
) -> ProbMap {
    names
        .into_iter()
        .filter_map(|name| match_reference(name, reference).map(|p| (name.to_string(), p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(items: &[(&str, f64)]) -> ProbMap {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_match_is_case_insensitive_containment() {
        let reference = map(&[("Manchester City Win", 0.8), ("Draw", 0.15)]);
        assert_eq!(match_reference("manchester city", &reference), Some(0.8));
        assert_eq!(match_reference("DRAW", &reference), Some(0.15));
        assert_eq!(match_reference("Salford", &reference), None);
    }

    #[test]
    fn test_exact_match_beats_containment() {
        let reference = map(&[("Arsenal Women", 0.3), ("Arsenal", 0.6)]);
        assert_eq!(match_reference("arsenal", &reference), Some(0.6));
    }

    #[test]
    fn test_empty_label_never_matches() {
        let reference = map(&[("", 0.5), ("Lakers", 0.5)]);
        assert_eq!(match_reference("", &reference), None);
        assert_eq!(match_reference("Celtics", &reference), None);
    }

    #[test]
    fn test_align_to_outcomes_skips_unmatched() {
        let reference = map(&[("Lakers", 0.6), ("Celtics", 0.4)]);
        let aligned = align_to_outcomes(["LA Lakers", "Boston Celtics", "Draw"], &reference);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned["LA Lakers"], 0.6);
    }

    #[test]
    fn test_consensus_averages_books() {
        let a = ReferenceOdds::new(
            ReferenceSource::Bookmaker("Pinnacle".into()),
            map(&[("Home", 2.0), ("Away", 2.0)]),
        );
        let b = ReferenceOdds::new(
            ReferenceSource::Bookmaker("Bet365".into()),
            map(&[("Home", 1.25), ("Away", 5.0)]),
        );

        let consensus = ReferenceOdds::consensus(&[a, b]).unwrap();
        assert_eq!(consensus.source, ReferenceSource::Consensus { books: 2 });

        let probs = consensus.probabilities();
        assert!((probs["Home"] - 0.65).abs() < 1e-9);
        assert!((probs["Away"] - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_consensus_of_nothing() {
        let empty = ReferenceOdds::user(map(&[("Home", 1.0)]));
        assert!(empty.is_empty());
        assert!(ReferenceOdds::consensus(&[empty]).is_none());
    }
}
