use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyQuote {
    /// Net odds received on a win per unit staked
    pub b_net: f64,
    pub f_full: f64,
    /// Fractional Kelly, floored at zero; bankroll caps are applied by the caller
    pub f_fractional: f64,
}

impl KellyQuote {
    const ZERO: KellyQuote = KellyQuote {
        b_net: 0.0,
        f_full: 0.0,
        f_fractional: 0.0,
    };
}

/// Kelly sizing for buying a binary share at `share_price` with fair
/// probability `p_fair`. Out-of-range inputs size to zero.
pub fn compute_fractional_kelly(p_fair: f64, share_price: f64, fractional: f64) -> KellyQuote {
    if !(share_price > 0.0 && share_price < 1.0) || !(0.0..=1.0).contains(&p_fair) {
        return KellyQuote::ZERO;
    }

    let b_net = (1.0 - share_price) / share_price;
    let q = 1.0 - p_fair;
    let f_full = (b_net * p_fair - q) / b_net;
    let f_fractional = (f_full * fractional.max(0.0)).max(0.0);

    KellyQuote {
        b_net,
        f_full,
        f_fractional,
    }
}

pub fn fractional_kelly_fraction(p_fair: f64, share_price: f64, fractional: f64) -> f64 {
    compute_fractional_kelly(p_fair, share_price, fractional).f_fractional
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelly_positive_with_edge() {
        let f = fractional_kelly_fraction(0.55, 0.50, 0.25);
        assert!(f > 0.0);
        assert!(f < 0.25);
        // full Kelly is 0.10 at even odds
        assert!((f - 0.025).abs() < 1e-12);
    }

    #[test]
    fn kelly_zero_when_negative_edge() {
        assert_eq!(fractional_kelly_fraction(0.45, 0.50, 0.25), 0.0);
        assert_eq!(fractional_kelly_fraction(0.50, 0.50, 0.25), 0.0);
    }

    #[test]
    fn kelly_zero_outside_price_range() {
        assert_eq!(fractional_kelly_fraction(0.9, 0.0, 0.25), 0.0);
        assert_eq!(fractional_kelly_fraction(0.9, 1.0, 0.25), 0.0);
        assert_eq!(fractional_kelly_fraction(0.9, -0.2, 0.25), 0.0);
        assert_eq!(fractional_kelly_fraction(1.2, 0.5, 0.25), 0.0);
        assert_eq!(fractional_kelly_fraction(-0.1, 0.5, 0.25), 0.0);
    }

    #[test]
    fn kelly_negative_multiplier_is_zero() {
        assert_eq!(fractional_kelly_fraction(0.7, 0.5, -1.0), 0.0);
    }

    #[test]
    fn kelly_quote_reports_full_fraction() {
        let q = compute_fractional_kelly(0.45, 0.50, 0.25);
        assert!(q.f_full < 0.0);
        assert_eq!(q.f_fractional, 0.0);
        assert!((q.b_net - 1.0).abs() < 1e-12);
    }
}
