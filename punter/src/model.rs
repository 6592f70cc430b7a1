//! The scoring model: combines a sport's votes into a calibrated distribution over outcomes and
//! values the best pick.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{debug, trace};

use crate::calibrate::temperature_scale;
use crate::calibration::Calibration;
use crate::ensemble::{Ballot, Contribution};
use crate::features::{FeatureExtractor, Features};
use crate::outcome::Outcome;
use crate::probs::{round_to, SliceExt};
use crate::record::MatchRecord;
use crate::sport::Sport;
use crate::value::{best_pick, Pick};

/// Scores match records for a given sport. Immutable once constructed; recalibration produces a
/// new model.
#[derive(Debug, Clone)]
pub struct ScoringModel<S> {
    sport: S,
    calibration: Calibration,
}
impl<S: Sport> ScoringModel<S> {
    /// Creates a model with the given calibration. An invalid temperature is replaced with the
    /// sport's default.
    pub fn new(sport: S, mut calibration: Calibration) -> Self {
        if !calibration.temperature.is_finite() || calibration.temperature <= 0.0 {
            let default_temperature = sport.default_calibration().temperature;
            debug!(
                "invalid temperature {}, falling back to {default_temperature}",
                calibration.temperature
            );
            calibration.temperature = default_temperature;
        }
        Self { sport, calibration }
    }

    pub fn with_defaults(sport: S) -> Self {
        let calibration = sport.default_calibration();
        Self::new(sport, calibration)
    }

    /// Creates a model from a calibration artifact, falling back to the sport's defaults if the
    /// artifact cannot be used.
    pub fn load(sport: S, path: impl AsRef<Path>) -> Self {
        let calibration = Calibration::load_or_default(path, &sport.default_calibration());
        Self::new(sport, calibration)
    }

    pub fn sport(&self) -> &S {
        &self.sport
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn recalibrated(&self, calibration: Calibration) -> Self
    where
        S: Clone,
    {
        Self::new(self.sport.clone(), calibration)
    }

    pub fn score(&self, record: &MatchRecord) -> ScoredResult<S::Outcome> {
        let features = self.sport.extractor().extract(record);

        let mut ballot = Ballot::default();
        self.sport
            .vote(record, &features, &self.calibration.weights, &mut ballot);
        let mut raw_probs = ballot.tally();
        raw_probs.clip_below(self.sport.floors());
        raw_probs.normalise(1.0);

        let calibrated_probs = temperature_scale(&raw_probs, self.calibration.temperature);
        let odds = self.sport.odds(record);
        let pick = best_pick(&calibrated_probs, &odds);
        let data_quality = features.data_quality();
        let confidence =
            self.sport
                .confidence_weights()
                .score(pick.prob, data_quality, &pick.valuation);
        trace!(
            "scored {} vs {}: raw {raw_probs:?}, calibrated {calibrated_probs:?}, pick {:?}",
            record.home_team.as_deref().unwrap_or_default(),
            record.away_team.as_deref().unwrap_or_default(),
            pick.outcome
        );

        ScoredResult {
            home_team: record.home_team.clone().unwrap_or_default(),
            away_team: record.away_team.clone().unwrap_or_default(),
            sport: record
                .sport
                .clone()
                .unwrap_or_else(|| self.sport.name().to_string()),
            raw_probs,
            calibrated_probs,
            pick,
            confidence,
            data_quality,
            features,
            contributions: ballot.into_contributions(),
        }
    }

    /// Scores records in parallel, returning the results in descending order of expected value.
    pub fn score_matches(&self, records: &[MatchRecord]) -> Vec<ScoredResult<S::Outcome>> {
        let mut results: Vec<_> = records.par_iter().map(|record| self.score(record)).collect();
        results.sort_by(|a, b| b.ev().total_cmp(&a.ev()));
        debug!(
            "scored {} records, {} with positive EV",
            results.len(),
            results.iter().filter(|result| result.ev() > 0.0).count()
        );
        results
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult<O> {
    pub home_team: String,
    pub away_team: String,
    pub sport: String,
    /// Renormalised ensemble output, indexed by outcome ordinal.
    pub raw_probs: Vec<f64>,
    /// Temperature-scaled probabilities, indexed by outcome ordinal.
    pub calibrated_probs: Vec<f64>,
    pub pick: Pick<O>,
    pub confidence: f64,
    pub data_quality: f64,
    pub features: Features,
    pub contributions: Vec<Contribution>,
}
impl<O: Outcome> ScoredResult<O> {
    pub fn prob(&self, outcome: O) -> f64 {
        self.calibrated_probs[outcome.as_index()]
    }

    pub fn raw_prob(&self, outcome: O) -> f64 {
        self.raw_probs[outcome.as_index()]
    }

    pub fn ev(&self) -> f64 {
        self.pick.valuation.ev
    }

    pub fn report(&self) -> ScoreReport {
        ScoreReport {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            sport: self.sport.clone(),
            probs: O::iter()
                .map(|outcome| {
                    (
                        format!("prob_{}", outcome.label()),
                        round_to(self.prob(outcome), 4),
                    )
                })
                .collect(),
            best_pick: self.pick.outcome.label().to_string(),
            best_prob: round_to(self.pick.prob, 4),
            best_odds: self.pick.odds,
            ev: round_to(self.pick.valuation.ev, 4),
            edge: round_to(self.pick.valuation.edge, 2),
            kelly: round_to(self.pick.valuation.kelly, 2),
            confidence: round_to(self.confidence, 1),
            data_quality: round_to(self.data_quality, 2),
            features: self
                .features
                .iter()
                .map(|(name, value)| (name.to_string(), round_to(value, 4)))
                .collect(),
            contributions: self.contributions.clone(),
        }
    }
}

/// The flat, serializable rendition of a [`ScoredResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub home_team: String,
    pub away_team: String,
    pub sport: String,
    #[serde(flatten)]
    pub probs: BTreeMap<String, f64>,
    pub best_pick: String,
    pub best_prob: f64,
    pub best_odds: Option<f64>,
    pub ev: f64,
    pub edge: f64,
    pub kelly: f64,
    pub confidence: f64,
    pub data_quality: f64,
    pub features: BTreeMap<String, f64>,
    pub contributions: Vec<Contribution>,
}

#[cfg(test)]
mod tests;
