//! Configuration sections

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum net EV (probability points) to recommend
    pub ev_min: f64,
    /// Minimum market liquidity in USDC
    pub liq_min: f64,
    /// Maximum effective bid/ask spread
    pub spread_max: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            ev_min: 0.02,
            liq_min: 2000.0,
            spread_max: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// Kelly multiplier (0.25 = quarter Kelly)
    pub fractional_kelly: f64,
    /// Hard cap per bet as a fraction of bankroll
    pub max_bet_pct: f64,
    /// Cap on the sum of stakes per UTC day as a fraction of bankroll
    pub max_daily_exposure: f64,
    /// Bankroll used when the caller does not provide one
    pub default_bankroll: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            fractional_kelly: 0.25,
            max_bet_pct: 0.01,
            max_daily_exposure: 0.05,
            default_bankroll: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// Hydrate outcomes from the CLOB order book before valuation
    pub enable_order_books: bool,
}
