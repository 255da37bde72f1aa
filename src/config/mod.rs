//! Configuration management for PolyBet
//!
//! Loads from YAML/TOML files + environment variables via .env. The resulting
//! `Settings` value is read-only and passed by reference into every engine
//! entry point.

mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::PolybetError;

/// Engine settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub thresholds: ThresholdConfig,
    pub sizing: SizingConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl Settings {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let defaults = Settings::default();
        let config = Config::builder()
            // Threshold defaults
            .set_default("thresholds.ev_min", defaults.thresholds.ev_min)?
            .set_default("thresholds.liq_min", defaults.thresholds.liq_min)?
            .set_default("thresholds.spread_max", defaults.thresholds.spread_max)?
            // Sizing defaults
            .set_default("sizing.fractional_kelly", defaults.sizing.fractional_kelly)?
            .set_default("sizing.max_bet_pct", defaults.sizing.max_bet_pct)?
            .set_default("sizing.max_daily_exposure", defaults.sizing.max_daily_exposure)?
            .set_default("sizing.default_bankroll", defaults.sizing.default_bankroll)?
            // Data defaults
            .set_default("data.enable_order_books", defaults.data.enable_order_books)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (POLYBET__*)
            .add_source(
                Environment::with_prefix("POLYBET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate().context("Invalid configuration")?;
        Ok(settings)
    }

    /// Reject values that would make gating or sizing meaningless
    pub fn validate(&self) -> std::result::Result<(), PolybetError> {
        let t = &self.thresholds;
        let s = &self.sizing;

        non_negative("thresholds.liq_min", t.liq_min)?;
        non_negative("thresholds.spread_max", t.spread_max)?;
        if !t.ev_min.is_finite() {
            return Err(PolybetError::InvalidSetting {
                field: "thresholds.ev_min",
                value: t.ev_min,
                reason: "must be finite",
            });
        }

        unit_interval("sizing.fractional_kelly", s.fractional_kelly)?;
        unit_interval("sizing.max_bet_pct", s.max_bet_pct)?;
        unit_interval("sizing.max_daily_exposure", s.max_daily_exposure)?;

        if !(s.default_bankroll > 0.0) {
            return Err(PolybetError::InvalidSetting {
                field: "sizing.default_bankroll",
                value: s.default_bankroll,
                reason: "must be positive",
            });
        }

        Ok(())
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "ev_min={:.3} liq_min={:.0} spread_max={:.3} kelly={:.2} max_bet={:.3} max_daily={:.3} bankroll={:.0} order_books={}",
            self.thresholds.ev_min,
            self.thresholds.liq_min,
            self.thresholds.spread_max,
            self.sizing.fractional_kelly,
            self.sizing.max_bet_pct,
            self.sizing.max_daily_exposure,
            self.sizing.default_bankroll,
            self.data.enable_order_books,
        )
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

fn non_negative(field: &'static str, value: f64) -> std::result::Result<(), PolybetError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PolybetError::InvalidSetting {
            field,
            value,
            reason: "must be >= 0",
        })
    }
}

fn unit_interval(field: &'static str, value: f64) -> std::result::Result<(), PolybetError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PolybetError::InvalidSetting {
            field,
            value,
            reason: "must be within [0, 1]",
        })
    }
}
