//! Market quality grade from liquidity, volume and spread

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::MarketSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
}

impl QualityGrade {
    fn from_score(score: u8) -> Self {
        match score {
            s if s >= 6 => QualityGrade::A,
            s if s >= 4 => QualityGrade::B,
            s if s >= 2 => QualityGrade::C,
            _ => QualityGrade::D,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityGrade::A => "excellent",
            QualityGrade::B => "good",
            QualityGrade::C => "fair",
            QualityGrade::D => "poor",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
        };
        write!(f, "{}", s)
    }
}

pub fn quality_score(liquidity: Option<f64>, volume_24h: Option<f64>, avg_spread: Option<f64>) -> u8 {
    let liq = match liquidity.unwrap_or(0.0) {
        l if l >= 50_000.0 => 3,
        l if l >= 10_000.0 => 2,
        l if l >= 1_000.0 => 1,
        _ => 0,
    };
    let vol = match volume_24h.unwrap_or(0.0) {
        v if v >= 10_000.0 => 2,
        v if v >= 1_000.0 => 1,
        _ => 0,
    };
    let spread = match avg_spread {
        Some(s) if s <= 0.02 => 2,
        Some(s) if s <= 0.05 => 1,
        _ => 0,
    };
    liq + vol + spread
}

/// Mean of the known outcome spreads
pub fn average_spread(snapshot: &MarketSnapshot) -> Option<f64> {
    let spreads: Vec<f64> = snapshot.outcomes.iter().filter_map(|o| o.spread).collect();
    if spreads.is_empty() {
        None
    } else {
        Some(spreads.iter().sum::<f64>() / spreads.len() as f64)
    }
}

pub fn grade_market(snapshot: &MarketSnapshot) -> QualityGrade {
    QualityGrade::from_score(quality_score(
        snapshot.liquidity,
        snapshot.volume_24h,
        average_spread(snapshot),
    ))
}
