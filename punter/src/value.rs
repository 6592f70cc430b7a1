//! Value-betting metrics: expected value, edge, Kelly stake, the best pick and its confidence.

use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};

use crate::market::is_valid_price;
use crate::outcome::Outcome;

/// Upper bound on the recommended Kelly stake, as a percentage of bankroll.
pub const KELLY_CAP: f64 = 25.0;

/// The value of backing an outcome with probability `prob` at decimal `odds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Valuation {
    /// Expected return per unit staked, `prob * odds - 1`.
    pub ev: f64,
    /// Model probability minus the implied probability, in percentage points.
    pub edge: f64,
    /// Fractional Kelly stake as a percentage, in `[0, KELLY_CAP]`.
    pub kelly: f64,
}
impl Valuation {
    /// `None` unless the odds are a valid price and the probability is finite.
    pub fn assess(prob: f64, odds: f64) -> Option<Valuation> {
        if !is_valid_price(odds) || !prob.is_finite() {
            return None;
        }
        let ev = prob * odds - 1.0;
        let edge = (prob - 1.0 / odds) * 100.0;
        let kelly = f64::min(KELLY_CAP, f64::max(0.0, ev / (odds - 1.0)) * 100.0);
        Some(Valuation { ev, edge, kelly })
    }

    pub fn none() -> Valuation {
        Valuation {
            ev: 0.0,
            edge: 0.0,
            kelly: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pick<O> {
    pub outcome: O,
    pub prob: f64,
    /// The price the pick is valued at; `None` if no outcome had a valid price.
    pub odds: Option<f64>,
    pub valuation: Valuation,
}

/// Picks the priced outcome with the highest expected value. Where no outcome has a valid price,
/// the most probable outcome is picked with zero EV, edge and Kelly. Ties go to the lower ordinal.
pub fn best_pick<O: Outcome>(probs: &[f64], odds: &[Option<f64>]) -> Pick<O> {
    debug_assert_eq!(O::COUNT, probs.len());
    debug_assert_eq!(O::COUNT, odds.len());

    let mut best_valued: Option<Pick<O>> = None;
    for outcome in O::iter() {
        let ordinal = outcome.as_index();
        let prob = probs[ordinal];
        let Some((price, valuation)) = odds[ordinal]
            .and_then(|price| Valuation::assess(prob, price).map(|valuation| (price, valuation)))
        else {
            continue;
        };
        match &best_valued {
            Some(best) if valuation.ev <= best.valuation.ev => {}
            _ => {
                best_valued = Some(Pick {
                    outcome,
                    prob,
                    odds: Some(price),
                    valuation,
                })
            }
        }
    }

    best_valued.unwrap_or_else(|| {
        let mut favourite = O::default();
        for outcome in O::iter() {
            if probs[outcome.as_index()] > probs[favourite.as_index()] {
                favourite = outcome;
            }
        }
        Pick {
            outcome: favourite,
            prob: probs[favourite.as_index()],
            odds: None,
            valuation: Valuation::none(),
        }
    })
}

/// Weights of the composite confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceWeights {
    pub prob: f64,
    pub data_quality: f64,
    pub edge: f64,
    pub positive_ev: f64,
    /// Edge (in percentage points) at which the edge term saturates.
    pub edge_cap: f64,
    /// Whether a negative edge may subtract from the score.
    pub penalise_negative_edge: bool,
}
impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            prob: 40.0,
            data_quality: 30.0,
            edge: 20.0,
            positive_ev: 10.0,
            edge_cap: 15.0,
            penalise_negative_edge: true,
        }
    }
}
impl ConfidenceWeights {
    /// Composite confidence in `[0, 100]`.
    pub fn score(&self, prob: f64, data_quality: f64, valuation: &Valuation) -> f64 {
        let edge = if self.penalise_negative_edge {
            f64::min(valuation.edge, self.edge_cap)
        } else {
            valuation.edge.clamp(0.0, self.edge_cap)
        };
        let confidence = prob * self.prob
            + data_quality * self.data_quality
            + edge / self.edge_cap * self.edge
            + if valuation.ev > 0.0 { self.positive_ev } else { 0.0 };
        if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;
    use crate::testing::Tri;

    #[test]
    fn assess_value() {
        let valuation = Valuation::assess(0.6, 2.0).unwrap();
        assert_float_absolute_eq!(0.2, valuation.ev, 1e-12);
        assert_float_absolute_eq!(10.0, valuation.edge, 1e-9);
        assert_float_absolute_eq!(20.0, valuation.kelly, 1e-9);
    }

    #[test]
    fn assess_negative_value() {
        let valuation = Valuation::assess(0.3, 2.0).unwrap();
        assert_float_absolute_eq!(-0.4, valuation.ev, 1e-12);
        assert_float_absolute_eq!(-20.0, valuation.edge, 1e-9);
        assert_eq!(0.0, valuation.kelly);
    }

    #[test]
    fn kelly_capped() {
        let valuation = Valuation::assess(0.9, 3.0).unwrap();
        assert_eq!(KELLY_CAP, valuation.kelly);
    }

    #[test]
    fn assess_rejects_bad_odds() {
        assert_eq!(None, Valuation::assess(0.5, 1.0));
        assert_eq!(None, Valuation::assess(0.5, 0.0));
        assert_eq!(None, Valuation::assess(0.5, f64::NAN));
        assert_eq!(None, Valuation::assess(f64::NAN, 2.0));
    }

    #[test]
    fn best_pick_by_ev() {
        let pick = best_pick::<Tri>(&[0.5, 0.3, 0.2], &[Some(1.8), Some(4.0), Some(4.0)]);
        assert_eq!(Tri::Middle, pick.outcome);
        assert_eq!(Some(4.0), pick.odds);
        assert_float_absolute_eq!(0.2, pick.valuation.ev, 1e-12);
    }

    #[test]
    fn best_pick_skips_unpriced() {
        let pick = best_pick::<Tri>(&[0.5, 0.3, 0.2], &[Some(1.0), None, Some(3.0)]);
        assert_eq!(Tri::Right, pick.outcome);
        assert_float_absolute_eq!(-0.4, pick.valuation.ev, 1e-12);
    }

    #[test]
    fn best_pick_without_prices() {
        let pick = best_pick::<Tri>(&[0.2, 0.5, 0.3], &[None, Some(0.9), None]);
        assert_eq!(Tri::Middle, pick.outcome);
        assert_eq!(0.5, pick.prob);
        assert_eq!(None, pick.odds);
        assert_eq!(Valuation::none(), pick.valuation);
    }

    #[test]
    fn best_pick_ties_go_to_lower_ordinal() {
        let pick = best_pick::<Tri>(&[0.4, 0.4, 0.2], &[None, None, None]);
        assert_eq!(Tri::Left, pick.outcome);
        let pick = best_pick::<Tri>(&[0.5, 0.25, 0.25], &[Some(2.0), Some(4.0), Some(4.0)]);
        assert_eq!(Tri::Left, pick.outcome);
    }

    #[test]
    fn confidence_penalises_negative_edge() {
        let weights = ConfidenceWeights::default();
        let valuation = Valuation::assess(0.65, 1.5).unwrap();
        let confidence = weights.score(0.65, 0.0, &valuation);
        let edge = (0.65 - 1.0 / 1.5) * 100.0;
        assert!(edge < 0.0);
        assert_float_absolute_eq!(26.0 + edge / 15.0 * 20.0, confidence, 1e-9);
    }

    #[test]
    fn confidence_clamps_edge_at_zero() {
        let weights = ConfidenceWeights {
            edge_cap: 20.0,
            penalise_negative_edge: false,
            ..ConfidenceWeights::default()
        };
        let valuation = Valuation::assess(0.5, 1.5).unwrap();
        assert_float_absolute_eq!(20.0, weights.score(0.5, 0.0, &valuation), 1e-9);
    }

    #[test]
    fn confidence_bounded() {
        let weights = ConfidenceWeights::default();
        let valuation = Valuation::assess(1.0, 101.0).unwrap();
        assert_eq!(100.0, weights.score(1.0, 1.0, &valuation));
        let valuation = Valuation::assess(0.0, 1.01).unwrap();
        assert_eq!(0.0, weights.score(0.0, 0.0, &valuation));
        assert_float_absolute_eq!(30.0, weights.score(0.0, 1.0, &Valuation::none()), 1e-12);
    }
}
