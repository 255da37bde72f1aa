//! User input: market URLs and pasted reference odds

use tracing::warn;
use url::Url;

use crate::types::{CandidateKind, ProbMap};
use crate::valuation::ReferenceOdds;

/// Slug extracted from a Polymarket URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugRef {
    pub kind: CandidateKind,
    pub slug: String,
}

/// Recognise `/event/<slug>`, `/market/<slug>` and `/sports/<league>/<slug>`
/// on http(s) URLs. Query, fragment and trailing slashes are ignored.
pub fn extract_slug(text: &str) -> Option<SlugRef> {
    let url = Url::parse(text.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let parts: Vec<&str> = url.path_segments()?.filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        ["event", slug, ..] => Some(SlugRef {
            kind: CandidateKind::Event,
            slug: slug.to_string(),
        }),
        ["market", slug, ..] => Some(SlugRef {
            kind: CandidateKind::Market,
            slug: slug.to_string(),
        }),
        ["sports", _league, .., slug] => Some(SlugRef {
            kind: CandidateKind::Event,
            slug: slug.to_string(),
        }),
        _ => None,
    }
}

fn is_decimal_literal(text: &str) -> bool {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next();
    !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

/// Parse `Name: 1.85` lines into user reference odds. Lines that do not
/// match, or carry odds of 1.0 or less, are skipped.
pub fn parse_reference_odds(text: &str) -> ReferenceOdds {
    let odds: ProbMap = text
        .lines()
        .filter_map(|line| {
            let (name, odd) = line.split_once(':')?;
            let name = name.trim();
            let odd = odd.trim();
            if name.is_empty() || !is_decimal_literal(odd) {
                return None;
            }
            let odd: f64 = odd.parse().ok()?;
            if odd <= 1.0 {
                warn!(name, odd, "Dropping reference odds at or below 1.0");
                return None;
            }
            Some((name.to_string(), odd))
        })
        .collect();

    ReferenceOdds::user(odds)
}
