//! Replays settled matches through a scoring model to measure its accuracy, Brier score and
//! value-betting return, and tunes the model's calibration against them.

use std::ops::RangeInclusive;

use anyhow::bail;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::calibration::Calibration;
use crate::model::ScoringModel;
use crate::opt::{univariate_descent, DescentConfig};
use crate::outcome::Outcome;
use crate::probs::round_to;
use crate::record::MatchRecord;
use crate::sport::Sport;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Settled records evaluated.
    pub total: usize,
    /// Evaluated records whose best pick matched the settled outcome.
    pub correct: usize,
    /// Records without a recognisable settled outcome.
    pub skipped: usize,
    pub accuracy: f64,
    /// Mean multi-class Brier score; 1 when nothing was evaluated.
    pub brier_score: f64,
    pub value_bets_placed: usize,
    /// Return on value bets, as a percentage of stakes.
    pub roi: f64,
    pub net_profit_units: f64,
}

/// Records paired with their settled outcome.
pub struct Settled<'a, O> {
    pub records: Vec<(&'a MatchRecord, O)>,
    pub skipped: usize,
}
impl<'a, O: Outcome> Settled<'a, O> {
    pub fn from_records(records: &'a [MatchRecord]) -> Self {
        let mut settled = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for record in records {
            match record.settled_label().and_then(O::from_label) {
                Some(outcome) => settled.push((record, outcome)),
                None => skipped += 1,
            }
        }
        Self {
            records: settled,
            skipped,
        }
    }
}

struct Replay {
    correct: bool,
    brier: f64,
    profit: Option<f64>,
}

fn replay<S: Sport>(model: &ScoringModel<S>, settled: &Settled<S::Outcome>) -> Vec<Replay> {
    settled
        .records
        .par_iter()
        .map(|&(record, actual)| {
            let result = model.score(record);
            let brier = S::Outcome::iter()
                .map(|outcome| {
                    let observed = if outcome == actual { 1.0 } else { 0.0 };
                    (result.prob(outcome) - observed).powi(2)
                })
                .sum();
            let correct = result.pick.outcome == actual;
            let profit = match result.pick.odds {
                Some(odds) if result.ev() > 0.0 => Some(if correct { odds - 1.0 } else { -1.0 }),
                _ => None,
            };
            Replay {
                correct,
                brier,
                profit,
            }
        })
        .collect()
}

/// Mean Brier score over the settled records; 1 when there are none.
pub fn brier_score<S: Sport>(model: &ScoringModel<S>, settled: &Settled<S::Outcome>) -> f64 {
    let replays = replay(model, settled);
    if replays.is_empty() {
        return 1.0;
    }
    replays.iter().map(|replay| replay.brier).sum::<f64>() / replays.len() as f64
}

/// Evaluates `model` against the settled records. Records lacking a valid settled outcome are
/// skipped and counted.
pub fn evaluate<S: Sport>(model: &ScoringModel<S>, records: &[MatchRecord]) -> Metrics {
    let settled = Settled::from_records(records);
    evaluate_settled(model, &settled)
}

pub fn evaluate_settled<S: Sport>(model: &ScoringModel<S>, settled: &Settled<S::Outcome>) -> Metrics {
    let replays = replay(model, settled);
    let total = replays.len();
    let correct = replays.iter().filter(|replay| replay.correct).count();
    let brier_sum: f64 = replays.iter().map(|replay| replay.brier).sum();
    let value_bets: Vec<_> = replays.iter().filter_map(|replay| replay.profit).collect();
    let net_profit: f64 = value_bets.iter().sum();

    let metrics = Metrics {
        total,
        correct,
        skipped: settled.skipped,
        accuracy: if total > 0 {
            round_to(correct as f64 / total as f64, 4)
        } else {
            0.0
        },
        brier_score: if total > 0 {
            round_to(brier_sum / total as f64, 4)
        } else {
            1.0
        },
        value_bets_placed: value_bets.len(),
        roi: if value_bets.is_empty() {
            0.0
        } else {
            round_to(net_profit / value_bets.len() as f64 * 100.0, 2)
        },
        net_profit_units: round_to(net_profit, 2),
    };
    debug!("evaluated {} {} records: {metrics:?}", total, model.sport().name());
    metrics
}

#[derive(Debug, Clone)]
pub struct TuneOptions {
    /// Passes over all tunable parameters.
    pub rounds: usize,
    pub init_step: f64,
    pub min_step: f64,
    pub max_steps: u64,
    pub temperature_bounds: RangeInclusive<f64>,
}
impl Default for TuneOptions {
    fn default() -> Self {
        Self {
            rounds: 2,
            init_step: 0.05,
            min_step: 0.001,
            max_steps: 50,
            temperature_bounds: 0.5..=3.0,
        }
    }
}
impl TuneOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.rounds == 0 {
            bail!("at least one round must be specified");
        }
        if self.init_step <= 0.0 || self.min_step <= 0.0 {
            bail!("steps must be positive");
        }
        if self.max_steps == 0 {
            bail!("at least one step must be specified");
        }
        let (min, max) = (*self.temperature_bounds.start(), *self.temperature_bounds.end());
        if !(min > 0.0 && min <= max && max.is_finite()) {
            bail!("invalid temperature bounds {min}..={max}");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Tuning {
    pub calibration: Calibration,
    pub before: Metrics,
    pub after: Metrics,
}

/// Coordinate descent over the source weights, then the temperature, minimising the Brier score
/// over the settled records. Weights are kept non-negative and the temperature within its bounds.
/// Returns the tuned calibration; `model` is left untouched.
pub fn tune<S: Sport + Clone>(
    model: &ScoringModel<S>,
    records: &[MatchRecord],
    options: &TuneOptions,
) -> Result<Tuning, anyhow::Error> {
    options.validate()?;
    let settled = Settled::from_records(records);
    let before = evaluate_settled(model, &settled);
    if settled.records.is_empty() {
        debug!("nothing to tune against");
        return Ok(Tuning {
            calibration: model.calibration().clone(),
            after: before.clone(),
            before,
        });
    }

    let mut calibration = model.calibration().clone();
    let mut best_brier = brier_score(model, &settled);
    let descent = |init_value: f64, bounds: RangeInclusive<f64>| DescentConfig {
        init_value,
        init_step: options.init_step,
        min_step: options.min_step,
        max_steps: options.max_steps,
        acceptable_residual: 0.0,
        bounds,
    };

    for round in 0..options.rounds {
        for source in calibration.weights.sources() {
            let init_value = calibration.weights.get(&source);
            let outcome = univariate_descent(&descent(init_value, 0.0..=f64::MAX), |weight| {
                let mut candidate = calibration.clone();
                candidate.weights.set(source.as_str(), weight);
                brier_score(&model.recalibrated(candidate), &settled)
            })?;
            if outcome.optimal_residual < best_brier {
                best_brier = outcome.optimal_residual;
                calibration.weights.set(source.as_str(), outcome.optimal_value);
            }
        }

        let init_value = calibration.temperature;
        let outcome = univariate_descent(
            &descent(init_value, options.temperature_bounds.clone()),
            |temperature| {
                let mut candidate = calibration.clone();
                candidate.temperature = temperature;
                brier_score(&model.recalibrated(candidate), &settled)
            },
        )?;
        if outcome.optimal_residual < best_brier {
            best_brier = outcome.optimal_residual;
            calibration.temperature = outcome.optimal_value;
        }
        debug!("tuning round {round}: brier {best_brier:.6}, {calibration:?}");
    }

    let after = evaluate_settled(&model.recalibrated(calibration.clone()), &settled);
    Ok(Tuning {
        calibration,
        before,
        after,
    })
}
