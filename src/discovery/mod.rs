//! Market Discovery - resolving user input to market snapshots
//!
//! The network clients live outside this crate; they plug in through the
//! `MarketSource` and `OrderBookSource` traits.

pub mod candidates;
pub mod input;
pub mod payload;

pub use candidates::choose_best_candidate;
pub use input::{extract_slug, parse_reference_odds, SlugRef};
pub use payload::{
    collect_search_candidates, is_sports_related, parse_event_payload, parse_market_payload,
    parse_order_book, BookTop, EventMarkets,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::types::{CandidateKind, MarketSnapshot};

/// Market metadata provider (Gamma)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn market_by_slug(&self, slug: &str) -> Result<Option<MarketSnapshot>>;

    async fn event_markets(&self, slug: &str) -> Result<Option<EventMarkets>>;

    /// Raw search response, fed to `collect_search_candidates`
    async fn search(&self, query: &str) -> Result<Value>;
}

/// Order book provider (CLOB)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderBookSource: Send + Sync {
    async fn best_quote(&self, token_id: &str) -> Result<Option<BookTop>>;

    async fn fee_rate_bps(&self, token_id: &str) -> Result<Option<f64>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    /// Outcomes with a token id
    pub requested: usize,
    /// Outcomes that received a quote
    pub hydrated: usize,
    /// Lookups that errored
    pub failed: usize,
}

/// Fill bid/ask/mid/spread and fee rate from the order book for every outcome
/// with a token id. Errors are logged and leave the fields unknown.
pub async fn hydrate_microstructure<S>(snapshot: &mut MarketSnapshot, source: &S) -> HydrationReport
where
    S: OrderBookSource + ?Sized,
{
    let mut report = HydrationReport::default();

    for outcome in snapshot.outcomes.iter_mut() {
        let Some(token_id) = outcome.token_id.clone() else {
            continue;
        };
        report.requested += 1;

        match source.best_quote(&token_id).await {
            Ok(Some(top)) => {
                outcome.apply_quote(top.best_bid, top.best_ask);
                report.hydrated += 1;
            }
            Ok(None) => debug!(token_id = %token_id, "No order book"),
            Err(e) => {
                warn!(token_id = %token_id, error = %e, "Order book lookup failed");
                report.failed += 1;
                continue;
            }
        }

        match source.fee_rate_bps(&token_id).await {
            Ok(fee) => outcome.fee_rate_bps = fee,
            Err(e) => debug!(token_id = %token_id, error = %e, "Fee rate lookup failed"),
        }
    }

    info!(
        slug = %snapshot.slug,
        requested = report.requested,
        hydrated = report.hydrated,
        failed = report.failed,
        "Microstructure hydrated"
    );
    report
}

/// Hydrate only when `data.enable_order_books` is set. `None` means the
/// order book was not consulted and microstructure stays as parsed.
pub async fn hydrate_if_enabled<S>(
    snapshot: &mut MarketSnapshot,
    source: &S,
    settings: &Settings,
) -> Option<HydrationReport>
where
    S: OrderBookSource + ?Sized,
{
    if !settings.data.enable_order_books {
        debug!(slug = %snapshot.slug, "Order books disabled, skipping hydration");
        return None;
    }
    Some(hydrate_microstructure(snapshot, source).await)
}

/// How a resolution was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    Url,
    Search,
}

#[derive(Debug, Clone)]
pub struct ResolvedMarkets {
    pub title: String,
    pub kind: CandidateKind,
    pub markets: Vec<MarketSnapshot>,
    pub path: ResolutionPath,
}

/// Load a slug as an event first, then as a single market. Lookup errors
/// are logged and treated as "not found".
async fn load_slug<S>(source: &S, slug: &str) -> Option<(String, CandidateKind, Vec<MarketSnapshot>)>
where
    S: MarketSource + ?Sized,
{
    match source.event_markets(slug).await {
        Ok(Some(event)) if !event.markets.is_empty() => {
            return Some((event.title, CandidateKind::Event, event.markets));
        }
        Ok(_) => debug!(slug, "No event for slug"),
        Err(e) => warn!(slug, error = %e, "Event lookup failed"),
    }

    match source.market_by_slug(slug).await {
        Ok(Some(market)) => Some((market.title.clone(), CandidateKind::Market, vec![market])),
        Ok(None) => {
            debug!(slug, "No market for slug");
            None
        }
        Err(e) => {
            warn!(slug, error = %e, "Market lookup failed");
            None
        }
    }
}

/// Resolve a URL or free text to markets.
///
/// URLs are tried as event, then market. Free text (or a URL that found
/// nothing) goes through search and candidate selection. `Ok(None)` when
/// nothing matches.
pub async fn resolve_markets<S>(input: &str, source: &S) -> Result<Option<ResolvedMarkets>>
where
    S: MarketSource + ?Sized,
{
    let query = match extract_slug(input) {
        Some(slug_ref) => {
            if let Some((title, kind, markets)) = load_slug(source, &slug_ref.slug).await {
                info!(slug = %slug_ref.slug, %kind, markets = markets.len(), "Resolved from URL");
                return Ok(Some(ResolvedMarkets {
                    title,
                    kind,
                    markets,
                    path: ResolutionPath::Url,
                }));
            }
            slug_ref.slug
        }
        None => input.trim().to_string(),
    };

    if query.is_empty() {
        return Ok(None);
    }

    let response = source
        .search(&query)
        .await
        .with_context(|| format!("search for '{}' failed", query))?;
    let candidates = collect_search_candidates(&response);
    debug!(query = %query, candidates = candidates.len(), "Search returned");

    let Some(best) = choose_best_candidate(&candidates, Utc::now()) else {
        info!(query = %query, "No usable candidate");
        return Ok(None);
    };

    Ok(load_slug(source, &best.slug)
        .await
        .map(|(title, kind, markets)| {
            info!(slug = %best.slug, %kind, markets = markets.len(), "Resolved from search");
            ResolvedMarkets {
                title,
                kind,
                markets,
                path: ResolutionPath::Search,
            }
        }))
}
