//! Feature extraction: the named features every sport derives from a match record, and the
//! transforms shared between sports.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use serde::Serialize;
use strum::EnumCount;

use crate::lenient;
use crate::outcome::{AsIndex, Side};
use crate::probs::SliceExt;
use crate::record::{Encounter, FormResult, MatchRecord};

/// Neutral value substituted for a feature that cannot be computed.
pub const NEUTRAL: f64 = 0.5;

/// A fully populated map of named features. Features derived from real data are marked as
/// observed; the rest hold a neutral default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Features {
    values: BTreeMap<&'static str, f64>,
    #[serde(skip)]
    observed: BTreeSet<&'static str>,
}
impl Features {
    pub const DATA_QUALITY: &'static str = "_data_quality";

    /// Records a feature computed from real data. A non-finite value is replaced with
    /// [`NEUTRAL`] and is not considered observed.
    pub fn observe(&mut self, name: &'static str, value: f64) {
        if value.is_finite() {
            self.values.insert(name, value);
            self.observed.insert(name);
        } else {
            self.assume(name, NEUTRAL);
        }
    }

    /// Records a neutral default for a feature that has no supporting data.
    pub fn assume(&mut self, name: &'static str, value: f64) {
        self.values.insert(name, value);
        self.observed.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// The value of a feature, or [`NEUTRAL`] if it was never recorded.
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(NEUTRAL)
    }

    pub fn is_observed(&self, name: &str) -> bool {
        self.observed.contains(name)
    }

    pub fn data_quality(&self) -> f64 {
        self.value(Self::DATA_QUALITY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().map(|(&name, &value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Converts a match record into [`Features`]. Implementations never fail; missing or malformed
/// data degrades to neutral defaults and a lower data quality.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, record: &MatchRecord) -> Features;
}

/// Tracks which feature groups were backed by real data. Each group counts at most once.
#[derive(Debug)]
pub struct Coverage<G> {
    covered: Vec<bool>,
    __phantom_data: PhantomData<G>,
}
impl<G: AsIndex + EnumCount> Coverage<G> {
    pub fn cover(&mut self, group: G) {
        self.covered[group.as_index()] = true;
    }

    pub fn covered(&self) -> usize {
        self.covered.iter().filter(|&&covered| covered).count()
    }

    /// Fraction of groups covered, in [0, 1].
    pub fn fraction(&self) -> f64 {
        self.covered() as f64 / G::COUNT as f64
    }
}
impl<G: AsIndex + EnumCount> Default for Coverage<G> {
    fn default() -> Self {
        Self {
            covered: vec![false; G::COUNT],
            __phantom_data: PhantomData,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct H2hScheme {
    /// Weight multiplier applied per position, newest encounter first.
    pub decay: f64,
    /// Credit for a drawn encounter, or `None` to skip draws altogether.
    pub draw_credit: Option<f64>,
    /// Number of encounters that make up a full sample.
    pub full_sample: usize,
    /// Maximum number of encounters considered.
    pub window: usize,
}
impl H2hScheme {
    pub fn full_sample_weight(&self) -> f64 {
        (0..self.full_sample).map(|i| self.decay.powi(i as i32)).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct H2hRate {
    /// Weighted fraction of encounters won by the focus contestant.
    pub rate: f64,
    pub weighted_total: f64,
    pub counted: usize,
    /// `min(1, weighted_total / full_sample_weight)`.
    pub confidence: f64,
}
impl H2hRate {
    /// Shrinks the rate toward `prior` in proportion to the missing sample.
    pub fn shrunk(&self, prior: f64) -> f64 {
        self.rate * self.confidence + (1.0 - self.confidence) * prior
    }
}

/// Orders encounters newest first. Dated encounters are sorted by descending date; undated ones
/// keep their relative order after them.
pub fn sort_newest_first(encounters: &[Encounter]) -> Vec<&Encounter> {
    let mut sorted: Vec<_> = encounters
        .iter()
        .map(|encounter| (encounter.date.as_deref().and_then(lenient::date), encounter))
        .collect();
    sorted.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted.into_iter().map(|(_, encounter)| encounter).collect()
}

/// Loose identity test between a contestant name and a name recorded against an encounter.
pub fn same_contestant(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    !a.is_empty() && !b.is_empty() && (a == b || a.contains(&b) || b.contains(&a))
}

/// Recency-weighted head-to-head win rate of `focus`. Returns `None` if no encounter has a legible
/// score with `focus` on one side.
pub fn h2h_rate(encounters: &[Encounter], focus: &str, scheme: &H2hScheme) -> Option<H2hRate> {
    let (mut weighted_wins, mut weighted_total, mut counted) = (0.0, 0.0, 0);
    let mut position = 0;
    for encounter in sort_newest_first(encounters).into_iter().take(scheme.window) {
        let Some((home_goals, away_goals)) = encounter.goals() else {
            continue;
        };
        let side = if encounter.home.as_deref().is_some_and(|home| same_contestant(focus, home)) {
            Side::Home
        } else if encounter.away.as_deref().is_some_and(|away| same_contestant(focus, away)) {
            Side::Away
        } else {
            continue;
        };
        let (own, other) = match side {
            Side::Home => (home_goals, away_goals),
            Side::Away => (away_goals, home_goals),
        };
        let credit = if own > other {
            1.0
        } else if own < other {
            0.0
        } else {
            match scheme.draw_credit {
                Some(credit) => credit,
                None => continue,
            }
        };
        let weight = scheme.decay.powi(position);
        position += 1;
        weighted_wins += credit * weight;
        weighted_total += weight;
        counted += 1;
    }

    if weighted_total <= 0.0 {
        return None;
    }
    Some(H2hRate {
        rate: weighted_wins / weighted_total,
        weighted_total,
        counted,
        confidence: f64::min(1.0, weighted_total / scheme.full_sample_weight()),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormScheme {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
    pub decay: f64,
    pub window: usize,
}
impl FormScheme {
    fn points(&self, result: FormResult) -> f64 {
        match result {
            FormResult::Win => self.win,
            FormResult::Draw => self.draw,
            FormResult::Loss => self.loss,
        }
    }
}

/// Recency-weighted form, normalised by the maximum attainable score. `None` for an empty form.
pub fn form_score(form: &[FormResult], scheme: &FormScheme) -> Option<f64> {
    let (mut scored, mut attainable) = (0.0, 0.0);
    for (index, &result) in form.iter().take(scheme.window).enumerate() {
        let weight = scheme.decay.powi(index as i32);
        scored += scheme.points(result) * weight;
        attainable += scheme.win * weight;
    }
    (attainable > 0.0).then(|| scored / attainable)
}

/// Number of consecutive wins at the head of the form.
pub fn streak(form: &[FormResult]) -> usize {
    form.iter()
        .take_while(|&&result| result == FormResult::Win)
        .count()
}

/// Smooth, bounded mapping of a ranking gap into (-1, 1). Positive when `own` is the better
/// (numerically lower) ranking.
pub fn ranking_gap(own: u32, opponent: u32, k: f64) -> f64 {
    let gap = opponent as f64 - own as f64;
    gap / (gap.abs() + k)
}

/// Normalises non-negative vote shares by their total. `None` if nothing was voted.
pub fn vote_shares(votes: &[Option<f64>]) -> Option<Vec<f64>> {
    let mut shares: Vec<_> = votes
        .iter()
        .map(|vote| vote.filter(|&vote| vote > 0.0).unwrap_or(0.0))
        .collect();
    let total = shares.sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    for share in &mut shares {
        *share /= total;
    }
    Some(shares)
}

#[cfg(test)]
mod tests;
