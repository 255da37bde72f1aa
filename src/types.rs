//! Core types used throughout PolyBet
//!
//! Market snapshots, outcomes and search candidates as handed to the
//! valuation engine by the market-data collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome name -> probability (or raw weight / decimal odds, depending on context)
pub type ProbMap = BTreeMap<String, f64>;

/// A single tradable outcome of a market
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome label, unique within its market
    pub name: String,
    /// Quoted market price (probability, 0.0 - 1.0)
    pub price: f64,
    /// Best bid from the order book, if known
    #[serde(default)]
    pub best_bid: Option<f64>,
    /// Best ask from the order book, if known
    #[serde(default)]
    pub best_ask: Option<f64>,
    /// Derived from bid/ask
    #[serde(default)]
    pub mid: Option<f64>,
    /// Derived from bid/ask, never negative
    #[serde(default)]
    pub spread: Option<f64>,
    /// CLOB token id used for order-book lookups
    #[serde(default)]
    pub token_id: Option<String>,
    /// Venue fee rate in basis points, if known
    #[serde(default)]
    pub fee_rate_bps: Option<f64>,
}

impl Outcome {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = Some(spread.max(0.0));
        self
    }

    pub fn with_fee_bps(mut self, fee_rate_bps: f64) -> Self {
        self.fee_rate_bps = Some(fee_rate_bps);
        self
    }

    /// Record top-of-book quotes. Mid and spread are only derived when both
    /// sides are present and the book is not crossed.
    pub fn apply_quote(&mut self, best_bid: Option<f64>, best_ask: Option<f64>) {
        self.best_bid = best_bid;
        self.best_ask = best_ask;

        if let (Some(bid), Some(ask)) = (best_bid, best_ask) {
            if ask >= bid {
                self.mid = Some((bid + ask) / 2.0);
                self.spread = Some(ask - bid);
            }
        }
    }

    /// Whether order-book microstructure is known for this outcome
    pub fn has_microstructure(&self) -> bool {
        self.spread.is_some()
    }

    pub fn is_yes(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case("yes")
    }
}

/// Point-in-time view of one market as returned by the market-data provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Provider tag (e.g. "gamma")
    pub source: String,
    /// Market question or title
    pub title: String,
    pub slug: String,
    /// Parent event slug, if the market belongs to an event
    pub event_slug: Option<String>,
    pub active: bool,
    pub closed: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Ordered outcomes; prices need not sum to 1.0
    pub outcomes: Vec<Outcome>,
    /// Liquidity in USDC, `None` when unknown
    pub liquidity: Option<f64>,
    /// 24h volume in USDC, `None` when unknown
    pub volume_24h: Option<f64>,
    pub open_interest: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    /// Untouched provider payload, kept for classification
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl MarketSnapshot {
    pub fn new(title: impl Into<String>, slug: impl Into<String>, outcomes: Vec<Outcome>) -> Self {
        Self {
            source: "manual".to_string(),
            title: title.into(),
            slug: slug.into(),
            event_slug: None,
            active: true,
            closed: false,
            start_date: None,
            end_date: None,
            outcomes,
            liquidity: None,
            volume_24h: None,
            open_interest: None,
            fetched_at: Utc::now(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn with_liquidity(mut self, liquidity: f64) -> Self {
        self.liquidity = Some(liquidity);
        self
    }

    pub fn with_volume_24h(mut self, volume: f64) -> Self {
        self.volume_24h = Some(volume);
        self
    }

    /// Sum of quoted prices
    pub fn implied_total(&self) -> f64 {
        self.outcomes.iter().map(|o| o.price).sum()
    }

    /// Amount by which quoted prices exceed 1.0 (negative when under-round)
    pub fn overround(&self) -> f64 {
        let total = self.implied_total();
        if total > 0.0 {
            total - 1.0
        } else {
            0.0
        }
    }

    pub fn market_prices(&self) -> ProbMap {
        self.outcomes
            .iter()
            .map(|o| (o.name.clone(), o.price))
            .collect()
    }

    /// Order-book mids for the outcomes that have one; `None` when no outcome does
    pub fn mid_prices(&self) -> Option<ProbMap> {
        let mids: ProbMap = self
            .outcomes
            .iter()
            .filter_map(|o| o.mid.map(|m| (o.name.clone(), m)))
            .collect();
        if mids.is_empty() {
            None
        } else {
            Some(mids)
        }
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn yes_outcome(&self) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.is_yes())
    }

    /// Group label of a sub-market inside an event (`groupItemTitle`)
    pub fn group_label(&self) -> Option<&str> {
        self.raw
            .get("groupItemTitle")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Kind of search hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Event,
    Market,
}

impl Default for CandidateKind {
    fn default() -> Self {
        CandidateKind::Market
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateKind::Event => write!(f, "event"),
            CandidateKind::Market => write!(f, "market"),
        }
    }
}

/// One item of a fuzzy market search, consumed once by candidate selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub slug: String,
    pub kind: CandidateKind,
    pub active: bool,
    pub closed: bool,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub sports_related: bool,
}

impl Default for Candidate {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            kind: CandidateKind::Market,
            active: false,
            closed: true,
            liquidity: 0.0,
            volume_24h: 0.0,
            start_date: None,
            sports_related: true,
        }
    }
}
