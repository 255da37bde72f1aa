//! Candidate selection among ambiguous search results

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::types::Candidate;

fn is_eligible(candidate: &Candidate) -> bool {
    candidate.active && !candidate.closed && !candidate.slug.is_empty()
}

/// Seconds between the candidate's start and `now`; unknown starts sort last
fn start_distance(candidate: &Candidate, now: DateTime<Utc>) -> Option<i64> {
    candidate
        .start_date
        .map(|start| (start - now).num_seconds().abs())
}

/// Liquidity desc, volume desc, start distance asc (unknown last), slug asc
fn rank(a: &Candidate, b: &Candidate, now: DateTime<Utc>) -> Ordering {
    b.liquidity
        .total_cmp(&a.liquidity)
        .then_with(|| b.volume_24h.total_cmp(&a.volume_24h))
        .then_with(|| match (start_distance(a, now), start_distance(b, now)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.slug.cmp(&b.slug))
}

/// Pick the single best active candidate. Sports-related candidates are
/// preferred when any survive filtering. The result does not depend on
/// input order.
pub fn choose_best_candidate(candidates: &[Candidate], now: DateTime<Utc>) -> Option<&Candidate> {
    let pool: Vec<&Candidate> = candidates.iter().filter(|c| is_eligible(c)).collect();
    let sports: Vec<&Candidate> = pool.iter().copied().filter(|c| c.sports_related).collect();
    let pool = if sports.is_empty() { pool } else { sports };

    pool.into_iter().min_by(|a, b| rank(a, b, now))
}
