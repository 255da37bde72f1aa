//! Exposure Budget - stake caps
//!
//! Implements:
//! - Per-bet cap as a fraction of bankroll
//! - Daily exposure cap, reset when the UTC date changes
//! - Cent-rounded stake amounts

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SizingConfig;
use crate::valuation::MarketValuation;

/// Round down to whole cents so caps are never exceeded by rounding
fn to_cents(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(2, RoundingStrategy::ToZero)
        .max(Decimal::ZERO)
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Kelly stake for one bet: `fraction × bankroll`, capped at
/// `max_bet_pct × bankroll`, in cents.
pub fn kelly_stake(kelly_fraction: f64, bankroll: f64, sizing: &SizingConfig) -> Decimal {
    let bankroll = decimal(bankroll).max(Decimal::ZERO);
    let wanted = decimal(kelly_fraction).max(Decimal::ZERO) * bankroll;
    let cap = decimal(sizing.max_bet_pct).max(Decimal::ZERO) * bankroll;
    to_cents(wanted.min(cap))
}

/// One granted stake
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeAllocation {
    pub market_slug: String,
    pub outcome: String,
    /// Stake before the daily cap
    pub requested: Decimal,
    pub granted: Decimal,
}

impl StakeAllocation {
    pub fn was_clipped(&self) -> bool {
        self.granted < self.requested
    }
}

/// Running stake total against per-bet and daily caps
#[derive(Debug, Clone)]
pub struct ExposureBudget {
    bankroll: f64,
    per_bet_cap: Decimal,
    daily_cap: Decimal,
    sizing: SizingConfig,
    day: NaiveDate,
    committed: Decimal,
}

impl ExposureBudget {
    pub fn new(bankroll: f64, sizing: &SizingConfig) -> Self {
        Self::starting_on(bankroll, sizing, Utc::now().date_naive())
    }

    pub fn starting_on(bankroll: f64, sizing: &SizingConfig, day: NaiveDate) -> Self {
        let bank = decimal(bankroll).max(Decimal::ZERO);
        Self {
            bankroll,
            per_bet_cap: to_cents(decimal(sizing.max_bet_pct) * bank),
            daily_cap: to_cents(decimal(sizing.max_daily_exposure) * bank),
            sizing: sizing.clone(),
            day,
            committed: Decimal::ZERO,
        }
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn per_bet_cap(&self) -> Decimal {
        self.per_bet_cap
    }

    pub fn daily_cap(&self) -> Decimal {
        self.daily_cap
    }

    /// Stakes granted so far on the current day
    pub fn committed(&self) -> Decimal {
        self.committed
    }

    pub fn remaining(&self) -> Decimal {
        (self.daily_cap - self.committed).max(Decimal::ZERO)
    }

    fn roll_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != self.day {
            info!(
                previous = %self.day,
                today = %today,
                committed = %self.committed,
                "New UTC day, resetting exposure budget"
            );
            self.day = today;
            self.committed = Decimal::ZERO;
        }
    }

    /// Grant up to `requested`, clipped to the per-bet cap and what is left
    /// of today's budget. Returns the granted amount.
    pub fn reserve(&mut self, requested: Decimal, now: DateTime<Utc>) -> Decimal {
        self.roll_day(now);

        let granted = to_cents(requested.min(self.per_bet_cap).min(self.remaining()));
        self.committed += granted;

        if granted < requested {
            warn!(
                requested = %requested,
                granted = %granted,
                remaining = %self.remaining(),
                "Stake clipped by exposure caps"
            );
        }
        granted
    }

    /// Reserve stakes for every recommended outcome of a market, in the
    /// market's outcome order. Outcomes that receive nothing are left out.
    pub fn allocate(
        &mut self,
        valuation: &MarketValuation,
        now: DateTime<Utc>,
    ) -> Vec<StakeAllocation> {
        let mut allocations = Vec::new();
        for outcome in valuation.recommended() {
            let requested = outcome
                .stake
                .unwrap_or_else(|| kelly_stake(outcome.kelly_fraction, self.bankroll, &self.sizing));
            let granted = self.reserve(requested, now);
            if granted.is_zero() {
                debug!(outcome = %outcome.name, "No budget left for outcome");
                continue;
            }
            allocations.push(StakeAllocation {
                market_slug: valuation.slug.clone(),
                outcome: outcome.name.clone(),
                requested,
                granted,
            });
        }
        allocations
    }
}
