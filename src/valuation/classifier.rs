//! Market type classification
//!
//! Rules are evaluated in order and the first match wins; a longer or more
//! specific keyword later in the list never overrides an earlier rule.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    Moneyline,
    Handicap,
    Total,
    GameWinner,
    Prop,
    Other,
}

impl MarketKind {
    /// Whether the market is valued as part of the event's win distribution
    pub fn is_match_result(&self) -> bool {
        matches!(self, MarketKind::Moneyline | MarketKind::GameWinner)
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketKind::Moneyline => "moneyline",
            MarketKind::Handicap => "handicap",
            MarketKind::Total => "total",
            MarketKind::GameWinner => "game_winner",
            MarketKind::Prop => "prop",
            MarketKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

const PROP_KEYWORDS: [&str; 5] = ["kill", "first", "tower", "baron", "dragon"];
const TOTAL_KEYWORDS: [&str; 3] = ["total", "o/u", "over/under"];

/// Lowercased classification input
#[derive(Debug, Clone)]
pub struct ClassifyInput {
    question: String,
    group: String,
}

impl ClassifyInput {
    pub fn new(question: &str, group: Option<&str>) -> Self {
        Self {
            question: question.trim().to_lowercase(),
            group: group.unwrap_or_default().trim().to_lowercase(),
        }
    }

    fn mentions_game_or_map(&self) -> bool {
        ["game", "map"]
            .iter()
            .any(|w| self.question.contains(w) || self.group.contains(w))
    }
}

type Predicate = fn(&ClassifyInput) -> bool;

/// A single (predicate, category) rule
pub struct Rule {
    pub name: &'static str,
    pub predicate: Predicate,
    pub kind: fn(&ClassifyInput) -> MarketKind,
}

fn match_winner_group(input: &ClassifyInput) -> bool {
    input.group == "match winner"
        || (input.group.contains("winner") && !input.group.contains("game"))
}

fn handicap(input: &ClassifyInput) -> bool {
    input.question.contains("handicap") || input.group.contains("handicap")
}

fn total(input: &ClassifyInput) -> bool {
    TOTAL_KEYWORDS.iter().any(|k| input.question.contains(k))
}

fn will_win(input: &ClassifyInput) -> bool {
    contains_in_order(&input.question, "will", "win") || input.group.contains("winner")
}

fn prop(input: &ClassifyInput) -> bool {
    PROP_KEYWORDS.iter().any(|k| input.question.contains(k))
}

fn win_or_draw(input: &ClassifyInput) -> bool {
    let q = &input.question;
    match (q.find("will "), q.find(" win or end in a draw")) {
        (Some(will), Some(tail)) => tail > will + "will ".len(),
        _ => false,
    }
}

fn moneyline(_: &ClassifyInput) -> MarketKind {
    MarketKind::Moneyline
}

fn handicap_kind(_: &ClassifyInput) -> MarketKind {
    MarketKind::Handicap
}

fn total_kind(_: &ClassifyInput) -> MarketKind {
    MarketKind::Total
}

fn winner_kind(input: &ClassifyInput) -> MarketKind {
    if input.mentions_game_or_map() {
        MarketKind::GameWinner
    } else {
        MarketKind::Moneyline
    }
}

fn prop_kind(_: &ClassifyInput) -> MarketKind {
    MarketKind::Prop
}

/// True when `first` occurs and `second` occurs somewhere after it
fn contains_in_order(text: &str, first: &str, second: &str) -> bool {
    text.find(first)
        .map(|i| text[i + first.len()..].contains(second))
        .unwrap_or(false)
}

/// Ordered classification rules; first match wins
pub const RULES: [Rule; 6] = [
    Rule {
        name: "match_winner_group",
        predicate: match_winner_group,
        kind: moneyline,
    },
    Rule {
        name: "handicap",
        predicate: handicap,
        kind: handicap_kind,
    },
    Rule {
        name: "total",
        predicate: total,
        kind: total_kind,
    },
    Rule {
        name: "will_win",
        predicate: will_win,
        kind: winner_kind,
    },
    Rule {
        name: "prop_keyword",
        predicate: prop,
        kind: prop_kind,
    },
    // "Will X win or end in a draw?" already matches will_win; this catches
    // the phrasing only if will_win changes
    Rule {
        name: "win_or_draw",
        predicate: win_or_draw,
        kind: moneyline,
    },
];

pub fn classify_market(question: &str, group: Option<&str>) -> MarketKind {
    let input = ClassifyInput::new(question, group);
    RULES
        .iter()
        .find(|rule| (rule.predicate)(&input))
        .map(|rule| (rule.kind)(&input))
        .unwrap_or(MarketKind::Other)
}
