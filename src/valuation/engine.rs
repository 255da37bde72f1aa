//! Valuation Engine - per-market and per-event valuation
//!
//! Ties classification, blending, cost, edge gating and Kelly sizing
//! together over a fully materialised snapshot. Pure: no I/O, no shared
//! mutable state, settings read by reference.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use super::blend::{blend_fair_probs, BlendTier, Confidence, FairEstimate};
use super::classifier::{classify_market, MarketKind};
use super::cost::CostBreakdown;
use super::edge::{evaluate_edge, Decision};
use super::kelly::fractional_kelly_fraction;
use super::probability::odds_overround;
use super::quality::{grade_market, QualityGrade};
use super::reference::{align_to_outcomes, ReferenceOdds, ReferenceSource};
use crate::config::Settings;
use crate::risk::kelly_stake;
use crate::types::{MarketSnapshot, Outcome, ProbMap};

/// Valuation of one outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeValuation {
    pub name: String,
    pub p_market: f64,
    pub p_fair: f64,
    pub cost: CostBreakdown,
    pub edge: f64,
    pub net_ev: f64,
    pub return_on_stake: f64,
    pub decision: Decision,
    /// Fractional Kelly before bankroll caps
    pub kelly_fraction: f64,
    /// Per-bet capped stake, only set when recommended
    pub stake: Option<Decimal>,
}

/// Valuation of one market
#[derive(Debug, Clone, Serialize)]
pub struct MarketValuation {
    pub analysis_id: Uuid,
    pub slug: String,
    pub title: String,
    pub kind: MarketKind,
    pub blend: BlendTier,
    pub confidence: Confidence,
    pub reference_source: Option<ReferenceSource>,
    pub overround: f64,
    pub grade: QualityGrade,
    pub liquidity: Option<f64>,
    pub outcomes: Vec<OutcomeValuation>,
}

impl MarketValuation {
    pub fn blend_label(&self) -> &'static str {
        self.blend.label()
    }

    /// Outcome with the highest net EV
    pub fn best(&self) -> Option<&OutcomeValuation> {
        best_by_net_ev(self.outcomes.iter())
    }

    pub fn recommended(&self) -> impl Iterator<Item = &OutcomeValuation> {
        self.outcomes.iter().filter(|o| o.decision.is_recommend())
    }
}

/// One side of an event's match-result distribution
#[derive(Debug, Clone, Serialize)]
pub struct EventLeg {
    pub market_slug: String,
    pub kind: MarketKind,
    pub liquidity: Option<f64>,
    pub valuation: OutcomeValuation,
}

/// Valuation of an event made of several binary sub-markets
#[derive(Debug, Clone, Serialize)]
pub struct EventValuation {
    pub analysis_id: Uuid,
    pub title: String,
    pub blend: BlendTier,
    pub confidence: Confidence,
    pub reference_source: Option<ReferenceSource>,
    /// Sum of the legs' "Yes" prices minus one
    pub overround: f64,
    pub legs: Vec<EventLeg>,
    /// Sub-markets outside the match-result distribution, valued on their own
    pub other_markets: Vec<MarketValuation>,
}

impl EventValuation {
    pub fn best_leg(&self) -> Option<&EventLeg> {
        self.legs.iter().fold(None, |best: Option<&EventLeg>, leg| match best {
            Some(b) if b.valuation.net_ev >= leg.valuation.net_ev => Some(b),
            _ => Some(leg),
        })
    }
}

fn best_by_net_ev<'a>(
    outcomes: impl Iterator<Item = &'a OutcomeValuation>,
) -> Option<&'a OutcomeValuation> {
    outcomes.fold(None, |best: Option<&OutcomeValuation>, o| match best {
        Some(b) if b.net_ev >= o.net_ev => Some(b),
        _ => Some(o),
    })
}

/// Stateless engine bound to a settings value
#[derive(Debug, Clone, Copy)]
pub struct ValuationEngine<'a> {
    settings: &'a Settings,
    bankroll: f64,
}

impl<'a> ValuationEngine<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            bankroll: settings.sizing.default_bankroll,
        }
    }

    pub fn with_bankroll(mut self, bankroll: f64) -> Self {
        self.bankroll = bankroll;
        self
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Value every outcome of a single market. Returns `None` for a market
    /// without outcomes.
    pub fn value_market(
        &self,
        snapshot: &MarketSnapshot,
        reference: Option<&ReferenceOdds>,
    ) -> Option<MarketValuation> {
        if snapshot.outcomes.is_empty() {
            debug!(slug = %snapshot.slug, "Market has no outcomes, skipping");
            return None;
        }

        let analysis_id = Uuid::new_v4();
        let span = info_span!("value_market", %analysis_id, slug = %snapshot.slug);
        let _guard = span.enter();

        let kind = classify_market(&snapshot.title, snapshot.group_label());
        let market = snapshot.market_prices();
        let mids = snapshot.mid_prices();
        let aligned = aligned_reference(
            snapshot.outcomes.iter().map(|o| o.name.as_str()),
            reference,
        );

        let fair = blend_fair_probs(&market, mids.as_ref(), aligned.as_ref());
        let confidence = confidence_for(&fair, snapshot.outcomes.iter());

        let outcomes: Vec<OutcomeValuation> = snapshot
            .outcomes
            .iter()
            .map(|o| self.value_outcome(&o.name, o, fair.prob(&o.name), snapshot.liquidity))
            .collect();

        let valuation = MarketValuation {
            analysis_id,
            slug: snapshot.slug.clone(),
            title: snapshot.title.clone(),
            kind,
            blend: fair.tier,
            confidence,
            reference_source: reference_source_if_used(&fair, reference),
            overround: snapshot.overround(),
            grade: grade_market(snapshot),
            liquidity: snapshot.liquidity,
            outcomes,
        };

        info!(
            kind = %valuation.kind,
            blend = %valuation.blend,
            confidence = %valuation.confidence,
            overround = valuation.overround,
            recommended = valuation.recommended().count(),
            "Market valued"
        );

        Some(valuation)
    }

    /// Value an event. The match-result sub-markets with a "Yes" side form one
    /// distribution when there are at least two of them: moneyline legs
    /// together with any draw market, or else the legs of a single game.
    /// Everything else is valued market by market.
    pub fn value_event(
        &self,
        title: &str,
        markets: &[MarketSnapshot],
        reference: Option<&ReferenceOdds>,
    ) -> Option<EventValuation> {
        if markets.is_empty() {
            return None;
        }

        let analysis_id = Uuid::new_v4();
        let span = info_span!("value_event", %analysis_id, title = %title);
        let _guard = span.enter();

        let classified: Vec<(&MarketSnapshot, MarketKind)> = markets
            .iter()
            .map(|s| (s, classify_market(&s.title, s.group_label())))
            .collect();
        let pool = distribution_pool(&classified);

        let mut candidates: Vec<(&MarketSnapshot, MarketKind, &Outcome)> = Vec::new();
        let mut others: Vec<&MarketSnapshot> = Vec::new();
        for (snapshot, kind) in classified {
            match snapshot.yes_outcome() {
                Some(yes) if matches!(pool, Some(p) if p.admits(snapshot, kind)) => {
                    candidates.push((snapshot, kind, yes))
                }
                _ => others.push(snapshot),
            }
        }

        let mut named: Vec<(String, &MarketSnapshot, MarketKind, &Outcome)> =
            Vec::with_capacity(candidates.len());
        for (snapshot, kind, yes) in candidates {
            let mut name = leg_name(snapshot);
            if named.iter().any(|(taken, ..)| *taken == name) {
                debug!(leg = %name, slug = %snapshot.slug, "Duplicate leg name, keyed by slug");
                name = snapshot.slug.clone();
            }
            named.push((name, snapshot, kind, yes));
        }

        let market: ProbMap = named
            .iter()
            .map(|(name, _, _, yes)| (name.clone(), yes.price))
            .collect();
        let mids: ProbMap = named
            .iter()
            .filter_map(|(name, _, _, yes)| yes.mid.map(|m| (name.clone(), m)))
            .collect();
        let aligned = aligned_reference(named.iter().map(|(n, _, _, _)| n.as_str()), reference);

        let fair = blend_fair_probs(&market, Some(&mids), aligned.as_ref());
        let confidence = confidence_for(&fair, named.iter().map(|(_, _, _, yes)| *yes));
        let overround = if market.is_empty() {
            0.0
        } else {
            market.values().sum::<f64>() - 1.0
        };

        let legs: Vec<EventLeg> = named
            .iter()
            .map(|(name, snapshot, kind, yes)| EventLeg {
                market_slug: snapshot.slug.clone(),
                kind: *kind,
                liquidity: snapshot.liquidity,
                valuation: self.value_outcome(name, yes, fair.prob(name), snapshot.liquidity),
            })
            .collect();

        let other_markets: Vec<MarketValuation> = others
            .into_iter()
            .filter_map(|s| self.value_market(s, reference))
            .collect();

        if legs.is_empty() && other_markets.is_empty() {
            return None;
        }

        info!(
            legs = legs.len(),
            other_markets = other_markets.len(),
            overround,
            blend = %fair.tier,
            "Event valued"
        );

        Some(EventValuation {
            analysis_id,
            title: title.to_string(),
            blend: fair.tier,
            confidence,
            reference_source: reference_source_if_used(&fair, reference),
            overround,
            legs,
            other_markets,
        })
    }

    fn value_outcome(
        &self,
        name: &str,
        outcome: &Outcome,
        p_fair: Option<f64>,
        liquidity: Option<f64>,
    ) -> OutcomeValuation {
        let p_fair = p_fair.unwrap_or(0.0);
        let quote = evaluate_edge(p_fair, outcome, liquidity, &self.settings.thresholds);
        let kelly_fraction =
            fractional_kelly_fraction(p_fair, outcome.price, self.settings.sizing.fractional_kelly);
        let stake = quote
            .decision
            .is_recommend()
            .then(|| kelly_stake(kelly_fraction, self.bankroll, &self.settings.sizing));

        debug!(
            outcome = %name,
            p_market = quote.p_market,
            p_fair,
            edge = quote.edge,
            cost = quote.cost.total(),
            net_ev = quote.net_ev,
            kelly_fraction,
            decision = %quote.decision,
            "Outcome valued"
        );

        OutcomeValuation {
            name: name.to_string(),
            p_market: quote.p_market,
            p_fair,
            cost: quote.cost,
            edge: quote.edge,
            net_ev: quote.net_ev,
            return_on_stake: quote.return_on_stake,
            decision: quote.decision,
            kelly_fraction,
            stake,
        }
    }
}

fn aligned_reference<'n>(
    names: impl IntoIterator<Item = &'n str>,
    reference: Option<&ReferenceOdds>,
) -> Option<ProbMap> {
    let reference = reference.filter(|r| !r.is_empty())?;
    debug!(
        source = %reference.source,
        margin = odds_overround(&reference.odds),
        "Using reference odds"
    );
    let aligned = align_to_outcomes(names, &reference.probabilities());
    if aligned.is_empty() {
        debug!(source = %reference.source, "Reference odds matched no outcome");
        None
    } else {
        Some(aligned)
    }
}

fn reference_source_if_used(
    fair: &FairEstimate,
    reference: Option<&ReferenceOdds>,
) -> Option<ReferenceSource> {
    if fair.tier.has_reference() {
        reference.map(|r| r.source.clone())
    } else {
        None
    }
}

/// Blend confidence, one step lower when any outcome has no quoted spread
fn confidence_for<'o>(fair: &FairEstimate, outcomes: impl Iterator<Item = &'o Outcome>) -> Confidence {
    let mut outcomes = outcomes.peekable();
    let base = fair.tier.confidence();
    if outcomes.peek().is_none() {
        return base;
    }
    if outcomes.all(|o| o.has_microstructure()) {
        base
    } else {
        base.downgrade()
    }
}

/// Which match-result markets make up an event's distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DistributionPool {
    /// Moneyline legs plus any draw market
    Match,
    /// Game-winner legs of one game or map
    Game(Option<u32>),
}

impl DistributionPool {
    fn admits(&self, snapshot: &MarketSnapshot, kind: MarketKind) -> bool {
        match self {
            DistributionPool::Match => {
                kind == MarketKind::Moneyline || is_draw_market(snapshot, kind)
            }
            DistributionPool::Game(game) => {
                kind == MarketKind::GameWinner && game_number(snapshot) == *game
            }
        }
    }
}

/// Moneyline legs when at least two exist, else the game with the most legs
/// (lowest game number on ties) when it has at least two.
fn distribution_pool(classified: &[(&MarketSnapshot, MarketKind)]) -> Option<DistributionPool> {
    let with_yes = || {
        classified
            .iter()
            .filter(|(s, _)| s.yes_outcome().is_some())
            .map(|(s, k)| (*s, *k))
    };

    if with_yes().filter(|(_, k)| *k == MarketKind::Moneyline).count() >= 2 {
        return Some(DistributionPool::Match);
    }

    let mut games: BTreeMap<Option<u32>, usize> = BTreeMap::new();
    for (snapshot, kind) in with_yes() {
        if kind == MarketKind::GameWinner {
            *games.entry(game_number(snapshot)).or_default() += 1;
        }
    }
    games
        .into_iter()
        .filter(|(_, legs)| *legs >= 2)
        .fold(None, |best: Option<(Option<u32>, usize)>, (game, legs)| match best {
            Some((_, most)) if most >= legs => best,
            _ => Some((game, legs)),
        })
        .map(|(game, _)| DistributionPool::Game(game))
}

/// A "Will the match end in a draw?" style market
fn is_draw_market(snapshot: &MarketSnapshot, kind: MarketKind) -> bool {
    kind == MarketKind::Other
        && (snapshot.title.to_lowercase().contains("draw")
            || snapshot
                .group_label()
                .map_or(false, |g| g.to_lowercase().contains("draw")))
}

/// Game or map number named in the question or group label ("Game 2", "map 3")
fn game_number(snapshot: &MarketSnapshot) -> Option<u32> {
    let text = format!(
        "{} {}",
        snapshot.title.to_lowercase(),
        snapshot.group_label().unwrap_or_default().to_lowercase()
    );
    ["game ", "map "].iter().find_map(|word| {
        text.match_indices(word).find_map(|(i, _)| {
            let digits: String = text[i + word.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        })
    })
}

/// Display name of an event leg: the group label, else "Draw" for a draw
/// market, else the question with the "Will " prefix and the " win ..." tail
/// removed.
pub fn leg_name(snapshot: &MarketSnapshot) -> String {
    if let Some(group) = snapshot.group_label() {
        return group.to_string();
    }

    let title = snapshot.title.trim();
    if is_draw_market(snapshot, classify_market(title, None)) {
        return "Draw".to_string();
    }

    let stripped = title
        .strip_prefix("Will ")
        .or_else(|| title.strip_prefix("will "))
        .unwrap_or(title);

    let cut = [" win on ", " win?", " win "]
        .iter()
        .filter_map(|tail| stripped.find(tail))
        .min()
        .or_else(|| stripped.find('?'))
        .unwrap_or(stripped.len());

    stripped[..cut].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::edge::GateFailure;
    use crate::valuation::probability::sum;

    fn odds(items: &[(&str, f64)]) -> ReferenceOdds {
        ReferenceOdds::user(items.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    fn binary_market(title: &str, slug: &str, yes: f64, liquidity: f64) -> MarketSnapshot {
        MarketSnapshot::new(
            title,
            slug,
            vec![
                Outcome::new("Yes", yes).with_spread(0.02),
                Outcome::new("No", 1.0 - yes).with_spread(0.02),
            ],
        )
        .with_liquidity(liquidity)
    }

    #[test]
    fn test_market_only_valuation_has_no_edge_over_normalized_prices() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let snap = binary_market("Will the Lakers win on 2026-03-01?", "lal", 0.55, 20_000.0);

        let v = engine.value_market(&snap, None).unwrap();

        assert_eq!(v.kind, MarketKind::Moneyline);
        assert_eq!(v.blend, BlendTier::MarketOnly);
        assert_eq!(v.blend_label(), "no external reference");
        assert_eq!(v.confidence, Confidence::Low);
        assert!(v.reference_source.is_none());
        for o in &v.outcomes {
            assert!(o.edge.abs() < 1e-12);
            assert!(o.kelly_fraction < 1e-9);
            assert!(o.decision.failures().contains(&GateFailure::Ev));
        }
    }

    #[test]
    fn test_reference_creates_recommendation() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let snap = MarketSnapshot::new(
            "Lakers vs Celtics",
            "lal-bos",
            vec![
                Outcome::new("Lakers", 0.40).with_spread(0.02),
                Outcome::new("Celtics", 0.60).with_spread(0.02),
            ],
        )
        .with_liquidity(25_000.0);
        let reference = odds(&[("LA Lakers", 1.6), ("Boston Celtics", 2.6)]);

        let v = engine.value_market(&snap, Some(&reference)).unwrap();

        assert_eq!(v.blend, BlendTier::MarketReference);
        assert_eq!(v.confidence, Confidence::Medium);
        assert_eq!(v.reference_source, Some(ReferenceSource::User));

        let lakers = &v.outcomes[0];
        assert!(lakers.p_fair > lakers.p_market);
        assert!(lakers.decision.is_recommend());
        assert!(lakers.kelly_fraction > 0.0);
        // capped at 1% of the 5000 default bankroll
        assert_eq!(lakers.stake, Some(Decimal::new(50, 0)));

        let celtics = &v.outcomes[1];
        assert!(!celtics.decision.is_recommend());
        assert_eq!(celtics.kelly_fraction, 0.0);
        assert!(celtics.stake.is_none());

        assert_eq!(v.best().unwrap().name, "Lakers");
        assert_eq!(v.recommended().count(), 1);
    }

    #[test]
    fn test_missing_microstructure_lowers_confidence() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let snap = MarketSnapshot::new(
            "Lakers vs Celtics",
            "lal-bos",
            vec![Outcome::new("Lakers", 0.40), Outcome::new("Celtics", 0.60)],
        );
        let reference = odds(&[("Lakers", 1.6), ("Celtics", 2.6)]);

        let v = engine.value_market(&snap, Some(&reference)).unwrap();

        assert_eq!(v.blend, BlendTier::MarketReference);
        assert_eq!(v.confidence, Confidence::Low);
        // unknown liquidity never passes the liquidity gate
        assert!(v
            .outcomes
            .iter()
            .all(|o| o.decision.failures().contains(&GateFailure::Liquidity)));
    }

    #[test]
    fn test_unmatched_reference_is_ignored() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let snap = binary_market("Will BTC hit 200k?", "btc", 0.2, 50_000.0);
        let reference = odds(&[("Arsenal", 2.0), ("Chelsea", 2.0)]);

        let v = engine.value_market(&snap, Some(&reference)).unwrap();
        assert_eq!(v.blend, BlendTier::MarketOnly);
        assert!(v.reference_source.is_none());
    }

    #[test]
    fn test_empty_market_is_none() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let snap = MarketSnapshot::new("Empty", "empty", vec![]);
        assert!(engine.value_market(&snap, None).is_none());
    }

    #[test]
    fn test_thresholds_come_from_settings() {
        let mut loose = Settings::default();
        loose.thresholds.ev_min = -1.0;
        loose.thresholds.liq_min = 0.0;
        let snap = binary_market("Will the Lakers win?", "lal", 0.55, 100.0);

        let strict_settings = Settings::default();
        let strict = ValuationEngine::new(&strict_settings).value_market(&snap, None).unwrap();
        let loose = ValuationEngine::new(&loose).value_market(&snap, None).unwrap();

        assert_eq!(strict.recommended().count(), 0);
        assert_eq!(loose.recommended().count(), 2);
    }

    #[test]
    fn test_event_legs_form_one_distribution() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let markets = vec![
            binary_market("Will Manchester City win on 2026-02-14?", "mci", 0.80, 60_000.0),
            binary_market("Will Salford City win on 2026-02-14?", "sal", 0.06, 60_000.0),
            binary_market("Will the match end in a draw?", "draw", 0.12, 60_000.0),
            binary_market("Total goals O/U 3.5", "ou", 0.45, 60_000.0),
        ];

        let ev = engine.value_event("Man City vs Salford", &markets, None).unwrap();

        let names: Vec<&str> = ev.legs.iter().map(|l| l.valuation.name.as_str()).collect();
        assert_eq!(names, vec!["Manchester City", "Salford City", "Draw"]);
        assert_eq!(ev.legs[2].kind, MarketKind::Other);
        assert!((ev.overround - (0.98 - 1.0)).abs() < 1e-12);

        let fair_total: f64 = ev.legs.iter().map(|l| l.valuation.p_fair).sum();
        assert!((fair_total - 1.0).abs() < 1e-9);

        // the draw keeps City's fair value near its price, so no edge survives costs
        let city = &ev.legs[0].valuation;
        assert!((city.p_fair - 0.80 / 0.98).abs() < 1e-9);
        assert!(city.net_ev < settings.thresholds.ev_min);
        assert!(city.decision.failures().contains(&GateFailure::Ev));
        assert!(ev.legs.iter().all(|l| !l.valuation.decision.is_recommend()));

        assert_eq!(ev.other_markets.len(), 1);
        assert_eq!(ev.other_markets[0].kind, MarketKind::Total);
        assert!(ev.best_leg().is_some());
    }

    #[test]
    fn test_duplicate_leg_names_are_keyed_by_slug() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let mut first = binary_market("Will T1 win the series?", "t1-series", 0.55, 60_000.0);
        first.raw = serde_json::json!({ "groupItemTitle": "T1" });
        let mut second = binary_market("Will T1 win on 2026-02-14?", "t1-match", 0.40, 60_000.0);
        second.raw = serde_json::json!({ "groupItemTitle": "T1" });

        let ev = engine.value_event("T1 vs Gen.G", &[first, second], None).unwrap();

        let names: Vec<&str> = ev.legs.iter().map(|l| l.valuation.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "t1-match"]);
        let fair_total: f64 = ev.legs.iter().map(|l| l.valuation.p_fair).sum();
        assert!((fair_total - 1.0).abs() < 1e-9);
        assert!((ev.legs[0].valuation.p_fair - 0.55 / 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_game_winners_from_different_games_are_not_pooled() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let game = |title: &str, slug: &str, group: &str, yes: f64| {
            let mut snap = binary_market(title, slug, yes, 60_000.0);
            snap.raw = serde_json::json!({ "groupItemTitle": group });
            snap
        };
        let markets = vec![
            game("Will T1 win game 1?", "t1-g1", "T1", 0.6),
            game("Will T1 win game 2?", "t1-g2", "T1", 0.3),
            game("Will Gen.G win game 1?", "gen-g1", "Gen.G", 0.4),
            game("Will Gen.G win game 2?", "gen-g2", "Gen.G", 0.7),
        ];

        let ev = engine.value_event("T1 vs Gen.G", &markets, None).unwrap();

        let slugs: Vec<&str> = ev.legs.iter().map(|l| l.market_slug.as_str()).collect();
        assert_eq!(slugs, vec!["t1-g1", "gen-g1"]);
        assert!(ev.legs.iter().all(|l| l.kind == MarketKind::GameWinner));
        let fair_total: f64 = ev.legs.iter().map(|l| l.valuation.p_fair).sum();
        assert!((fair_total - 1.0).abs() < 1e-9);
        assert!(ev.overround.abs() < 1e-12);

        let others: Vec<&str> = ev.other_markets.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(others, vec!["t1-g2", "gen-g2"]);
    }

    #[test]
    fn test_lone_game_winners_are_valued_alone() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let markets = vec![
            binary_market("Will T1 win game 1?", "t1-g1", 0.6, 60_000.0),
            binary_market("Will T1 win game 2?", "t1-g2", 0.3, 60_000.0),
        ];

        let ev = engine.value_event("T1 vs Gen.G", &markets, None).unwrap();
        assert!(ev.legs.is_empty());
        assert_eq!(ev.other_markets.len(), 2);
    }

    #[test]
    fn test_event_with_single_result_market_values_markets_individually() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let markets = vec![
            binary_market("Total goals O/U 2.5", "ou", 0.45, 60_000.0),
            binary_market("Will Arsenal win?", "ars", 0.55, 60_000.0),
        ];

        let ev = engine.value_event("Arsenal vs Spurs", &markets, None).unwrap();
        assert!(ev.legs.is_empty());
        assert_eq!(ev.other_markets.len(), 2);
        assert_eq!(ev.other_markets[0].slug, "ou");
        assert_eq!(ev.other_markets[1].slug, "ars");
    }

    #[test]
    fn test_event_reference_matches_legs() {
        let settings = Settings::default();
        let engine = ValuationEngine::new(&settings);
        let markets = vec![
            binary_market("Will Manchester City win on 2026-02-14?", "mci", 0.70, 60_000.0),
            binary_market("Will Salford City win on 2026-02-14?", "sal", 0.20, 60_000.0),
        ];
        let reference = odds(&[("Manchester City", 1.25), ("Salford City", 5.0)]);

        let ev = engine.value_event("Man City vs Salford", &markets, Some(&reference)).unwrap();
        assert_eq!(ev.blend, BlendTier::MarketReference);
        let probs: ProbMap = ev
            .legs
            .iter()
            .map(|l| (l.valuation.name.clone(), l.valuation.p_fair))
            .collect();
        assert!((sum(&probs) - 1.0).abs() < 1e-9);
        assert!(probs["Manchester City"] > 0.70);
    }

    #[test]
    fn test_leg_name() {
        let snap = binary_market("Will Manchester City win on 2026-02-14?", "mci", 0.8, 0.0);
        assert_eq!(leg_name(&snap), "Manchester City");

        let snap = binary_market("Will Arsenal win?", "ars", 0.5, 0.0);
        assert_eq!(leg_name(&snap), "Arsenal");

        let mut snap = binary_market("Will T1 win?", "t1", 0.5, 0.0);
        snap.raw = serde_json::json!({ "groupItemTitle": "T1" });
        assert_eq!(leg_name(&snap), "T1");

        let snap = binary_market("Will the match end in a draw?", "draw", 0.2, 0.0);
        assert_eq!(leg_name(&snap), "Draw");
    }

    #[test]
    fn test_game_number() {
        let snap = binary_market("Will T1 win game 12?", "t1", 0.5, 0.0);
        assert_eq!(game_number(&snap), Some(12));

        let mut snap = binary_market("T1", "t1", 0.5, 0.0);
        snap.raw = serde_json::json!({ "groupItemTitle": "Map 3 Winner" });
        assert_eq!(game_number(&snap), Some(3));

        let snap = binary_market("Will T1 win the game?", "t1", 0.5, 0.0);
        assert_eq!(game_number(&snap), None);
    }
}
