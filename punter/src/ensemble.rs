//! Weighted ensemble voting. Each source casts per-outcome estimates with a weight; the tally is
//! the per-outcome weighted average.

use std::marker::PhantomData;

use anyhow::bail;
use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};

use crate::outcome::Outcome;

/// A single `(estimate, weight)` vote cast by a source for one outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub source: &'static str,
    pub outcome: &'static str,
    pub estimate: f64,
    pub weight: f64,
}

/// How a source that favours one outcome distributes the complement of its estimate across the
/// remaining outcomes. Row `i` holds the shares used when outcome `i` is the favourite; the
/// diagonal is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplementSplit<O> {
    rows: Vec<Vec<f64>>,
    __phantom_data: PhantomData<O>,
}
impl<O: Outcome> ComplementSplit<O> {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self {
            rows,
            __phantom_data: PhantomData,
        }
    }

    /// Splits the complement evenly among the remaining outcomes.
    pub fn even() -> Self {
        let share = if O::COUNT > 1 {
            1.0 / (O::COUNT - 1) as f64
        } else {
            0.0
        };
        let rows = (0..O::COUNT)
            .map(|favourite| {
                (0..O::COUNT)
                    .map(|other| if other == favourite { 0.0 } else { share })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    pub fn share(&self, favourite: O, other: O) -> f64 {
        if favourite == other {
            0.0
        } else {
            self.rows[favourite.as_index()][other.as_index()]
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.rows.len() != O::COUNT {
            bail!(
                "expected {} rows in complement split, got {}",
                O::COUNT,
                self.rows.len()
            );
        }
        for (favourite, row) in self.rows.iter().enumerate() {
            if row.len() != O::COUNT {
                bail!(
                    "expected {} shares in complement split row {favourite}, got {}",
                    O::COUNT,
                    row.len()
                );
            }
            let mut sum = 0.0;
            for (other, &share) in row.iter().enumerate() {
                if other == favourite {
                    continue;
                }
                if !share.is_finite() || share < 0.0 {
                    bail!("invalid share {share} in complement split row {favourite}");
                }
                sum += share;
            }
            const EPSILON: f64 = 1e-9;
            if O::COUNT > 1 && (sum - 1.0).abs() > EPSILON {
                bail!("shares in complement split row {favourite} sum to {sum}, expected 1");
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Ballot<O> {
    weighted_sums: Vec<f64>,
    weights: Vec<f64>,
    contributions: Vec<Contribution>,
    __phantom_data: PhantomData<O>,
}
impl<O: Outcome> Default for Ballot<O> {
    fn default() -> Self {
        Self {
            weighted_sums: vec![0.0; O::COUNT],
            weights: vec![0.0; O::COUNT],
            contributions: vec![],
            __phantom_data: PhantomData,
        }
    }
}
impl<O: Outcome> Ballot<O> {
    /// Casts a vote for one outcome. Votes with a non-finite estimate or a non-positive weight are
    /// discarded.
    pub fn cast(&mut self, source: &'static str, outcome: O, estimate: f64, weight: f64) {
        if !estimate.is_finite() || !weight.is_finite() || weight <= 0.0 {
            return;
        }
        let ordinal = outcome.as_index();
        self.weighted_sums[ordinal] += estimate * weight;
        self.weights[ordinal] += weight;
        self.contributions.push(Contribution {
            source,
            outcome: outcome.label(),
            estimate,
            weight,
        });
    }

    /// Casts one estimate per outcome, indexed by ordinal.
    pub fn cast_all(&mut self, source: &'static str, estimates: &[f64], weight: f64) {
        debug_assert_eq!(O::COUNT, estimates.len());
        for (outcome, &estimate) in O::iter().zip(estimates) {
            self.cast(source, outcome, estimate, weight);
        }
    }

    /// Casts `estimate` for the `favourite` and splits `1 - estimate` across the other outcomes.
    pub fn cast_favourite(
        &mut self,
        source: &'static str,
        favourite: O,
        estimate: f64,
        weight: f64,
        split: &ComplementSplit<O>,
    ) {
        let complement = 1.0 - estimate;
        for outcome in O::iter() {
            let estimate = if outcome == favourite {
                estimate
            } else {
                complement * split.share(favourite, outcome)
            };
            self.cast(source, outcome, estimate, weight);
        }
    }

    /// The weighted average estimate for each outcome. An outcome that received no weight gets the
    /// neutral prior `1/N`.
    pub fn tally(&self) -> Vec<f64> {
        self.weighted_sums
            .iter()
            .zip(&self.weights)
            .map(|(&sum, &weight)| {
                if weight > 0.0 {
                    sum / weight
                } else {
                    O::neutral_prior()
                }
            })
            .collect()
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn into_contributions(self) -> Vec<Contribution> {
        self.contributions
    }
}
