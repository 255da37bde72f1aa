//! Gamma / CLOB JSON payload parsing
//!
//! Provider payloads are loosely typed: lists arrive either as JSON arrays or
//! as JSON-encoded strings, numbers sometimes as strings, and several keys
//! have aliases. Everything here tolerates that and falls back to defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PolybetError, Result};
use crate::types::{Candidate, CandidateKind, MarketSnapshot, Outcome};

const SPORT_HINTS: [&str; 10] = [
    "sport", "sports", "nba", "nfl", "nhl", "mlb", "soccer", "football", "tennis", "ufc",
];
const SPORT_FIELDS: [&str; 6] = ["category", "groupItemTitle", "title", "question", "sport", "league"];
const SEARCH_LISTS: [&str; 4] = ["markets", "events", "data", "results"];

/// Top of an order book; `None` sides are unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BookTop {
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
}

/// An event and its parsed sub-markets
#[derive(Debug, Clone)]
pub struct EventMarkets {
    pub title: String,
    pub slug: String,
    pub markets: Vec<MarketSnapshot>,
}

/// Python-style truthiness, used to pick between aliased keys
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First truthy value among `keys`
fn field<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| payload.get(*k))
        .find(|v| is_truthy(v))
}

fn to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_field(payload: &Value, keys: &[&str]) -> Option<String> {
    field(payload, keys).and_then(|v| v.as_str()).map(str::to_string)
}

/// A list given either inline or as a JSON-encoded string
fn list_items(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn outcome_label(item: &Value) -> String {
    match item {
        Value::Object(_) => item
            .get("outcome")
            .map(text_of)
            .unwrap_or_else(|| item.to_string()),
        other => text_of(other),
    }
}

/// Parse one market payload into a snapshot.
///
/// Prices are clamped to [0, 1]; an outcome without a price gets 0.0.
pub fn parse_market_payload(payload: &Value) -> Result<MarketSnapshot> {
    if !payload.is_object() {
        return Err(PolybetError::Payload(format!(
            "expected a market object, got {}",
            json_kind(payload)
        )));
    }

    let names: Vec<String> = list_items(field(payload, &["outcomes", "tokens"]))
        .iter()
        .map(outcome_label)
        .collect();
    let prices: Vec<f64> = list_items(field(payload, &["outcomePrices", "prices"]))
        .iter()
        .map(|p| to_f64(p).unwrap_or(0.0).clamp(0.0, 1.0))
        .collect();
    let token_ids: Vec<String> = list_items(field(payload, &["clobTokenIds", "token_ids"]))
        .iter()
        .map(text_of)
        .collect();

    let outcomes = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| Outcome {
            name,
            price: prices.get(idx).copied().unwrap_or(0.0),
            token_id: token_ids.get(idx).filter(|t| !t.is_empty()).cloned(),
            ..Default::default()
        })
        .collect();

    let mut snapshot = MarketSnapshot::new(
        string_field(payload, &["question", "title"]).unwrap_or_else(|| "Unknown".to_string()),
        string_field(payload, &["slug"]).unwrap_or_else(|| "unknown".to_string()),
        outcomes,
    );
    snapshot.source = "gamma".to_string();
    snapshot.event_slug = string_field(payload, &["eventSlug"]);
    snapshot.active = payload.get("active").and_then(Value::as_bool).unwrap_or(false);
    snapshot.closed = payload.get("closed").and_then(Value::as_bool).unwrap_or(true);
    snapshot.start_date = field(payload, &["startDate", "startTime"]).and_then(to_datetime);
    snapshot.end_date = field(payload, &["endDate", "endTime"]).and_then(to_datetime);
    snapshot.liquidity = field(payload, &["liquidity", "liquidityNum"]).and_then(to_f64);
    snapshot.volume_24h = field(payload, &["volume24hr", "volume24Hr"]).and_then(to_f64);
    snapshot.open_interest = field(payload, &["openInterest"]).and_then(to_f64);
    snapshot.raw = payload.clone();

    Ok(snapshot)
}

/// Parse an event payload and its `markets` list. Sub-markets that fail to
/// parse are skipped.
pub fn parse_event_payload(payload: &Value) -> Result<EventMarkets> {
    if !payload.is_object() {
        return Err(PolybetError::Payload(format!(
            "expected an event object, got {}",
            json_kind(payload)
        )));
    }

    let markets = list_items(payload.get("markets"))
        .iter()
        .filter_map(|m| parse_market_payload(m).ok())
        .collect();

    Ok(EventMarkets {
        title: string_field(payload, &["title"]).unwrap_or_else(|| "Unknown Event".to_string()),
        slug: string_field(payload, &["slug"]).unwrap_or_else(|| "unknown".to_string()),
        markets,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn contains_sport_hint(text: &str) -> bool {
    let text = text.to_lowercase();
    SPORT_HINTS.iter().any(|h| text.contains(h))
}

pub fn is_sports_related(item: &Value) -> bool {
    let text: Vec<String> = SPORT_FIELDS
        .iter()
        .map(|k| item.get(*k).map(text_of).unwrap_or_default())
        .collect();
    if contains_sport_hint(&text.join(" ")) {
        return true;
    }

    match item.get("tags") {
        Some(Value::Array(tags)) => {
            let joined: Vec<String> = tags.iter().map(text_of).collect();
            contains_sport_hint(&joined.join(" "))
        }
        _ => false,
    }
}

fn candidate_kind(item: &Value) -> CandidateKind {
    match item.get("type").and_then(Value::as_str) {
        Some(t) if t.eq_ignore_ascii_case("event") => CandidateKind::Event,
        Some(t) if t.eq_ignore_ascii_case("market") => CandidateKind::Market,
        _ if field(item, &["markets"]).map_or(false, Value::is_array) => CandidateKind::Event,
        _ => CandidateKind::Market,
    }
}

/// Flatten a search response into candidates
pub fn collect_search_candidates(payload: &Value) -> Vec<Candidate> {
    SEARCH_LISTS
        .iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_array))
        .flatten()
        .filter(|item| item.is_object())
        .map(|item| Candidate {
            title: string_field(item, &["question", "title"]).unwrap_or_else(|| "Unknown".to_string()),
            slug: string_field(item, &["slug"]).unwrap_or_default(),
            kind: candidate_kind(item),
            active: item.get("active").and_then(Value::as_bool).unwrap_or(false),
            closed: item.get("closed").and_then(Value::as_bool).unwrap_or(true),
            liquidity: field(item, &["liquidity", "liquidityNum"])
                .and_then(to_f64)
                .unwrap_or(0.0),
            volume_24h: field(item, &["volume24hr", "volume24Hr"])
                .and_then(to_f64)
                .unwrap_or(0.0),
            start_date: field(item, &["startDate", "startTime"]).and_then(to_datetime),
            sports_related: is_sports_related(item),
        })
        .collect()
}

fn level_prices(book: &Value, side: &str) -> impl Iterator<Item = f64> {
    list_items(book.get(side))
        .into_iter()
        .filter_map(|level| level.get("price").and_then(to_f64))
        .filter(|p| *p > 0.0)
}

/// Best bid is the highest bid price, best ask the lowest ask price
pub fn parse_order_book(book: &Value) -> BookTop {
    BookTop {
        best_bid: level_prices(book, "bids").reduce(f64::max),
        best_ask: level_prices(book, "asks").reduce(f64::min),
    }
}
