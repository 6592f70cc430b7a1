//! The football voting policy: how each source's features turn into per-outcome votes.

use anyhow::bail;
use strum::IntoEnumIterator;

use punter::calibration::{Calibration, Weights};
use punter::ensemble::{Ballot, ComplementSplit};
use punter::features::Features;
use punter::outcome::Side;
use punter::record::MatchRecord;
use punter::sport::Sport;
use punter::value::ConfidenceWeights;

use crate::domain::{FootballOutcome, Source};
use crate::features::{
    FootballExtractor, AWAY_FORM, AWAY_VENUE_FORM, FOREBET_PRED, FOREBET_PROB, GEMINI_CONF,
    GEMINI_HIGH, GEMINI_PRED, H2H_CONFIDENCE, H2H_WIN_RATE, HOME_FORM, HOME_VENUE_FORM, ODDS,
    SOFASCORE,
};

/// Linear vote derived from the difference between two strength measures, each in `[0, 1]`.
/// The estimates are `base ± diff · slope` for the two sides and `base - |diff| · slope` for the
/// draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffVote {
    pub base: [f64; 3],
    pub slope: [f64; 3],
}
impl DiffVote {
    fn estimates(&self, diff: f64) -> [f64; 3] {
        [
            self.base[0] + diff * self.slope[0],
            self.base[1] - diff.abs() * self.slope[1],
            self.base[2] - diff * self.slope[2],
        ]
    }

    fn cast(
        &self,
        source: Source,
        (home, away): (f64, f64),
        weight: f64,
        ballot: &mut Ballot<FootballOutcome>,
    ) {
        ballot.cast_all(source.key(), &self.estimates(home - away), weight);
    }

    fn validate(&self, name: &str) -> Result<(), anyhow::Error> {
        for estimate in [self.estimates(-1.0), self.estimates(0.0), self.estimates(1.0)] {
            if estimate.iter().any(|&estimate| !(0.0..=1.0).contains(&estimate)) {
                bail!("{name} vote produces estimates {estimate:?} outside [0, 1]");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub calibration: Calibration,
    pub split: ComplementSplit<FootballOutcome>,
    /// Prior that the H2H win rate is shrunk toward, by focus side.
    pub h2h_prior: [f64; 2],
    pub form_vote: DiffVote,
    pub venue_vote: DiffVote,
    /// Weight multiplier for a prediction flagged as high-confidence.
    pub high_confidence_boost: f64,
    pub floors: Vec<f64>,
    pub confidence: ConfidenceWeights,
}
impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.calibration.validate()?;
        for source in Source::iter() {
            if !self.calibration.weights.contains(source.key()) {
                bail!("missing weight for {source}");
            }
        }
        self.split.validate()?;
        if self.h2h_prior.iter().any(|&prior| !(0.0..=1.0).contains(&prior)) {
            bail!("H2H priors {:?} outside [0, 1]", self.h2h_prior);
        }
        self.form_vote.validate("form")?;
        self.venue_vote.validate("venue form")?;
        if !self.high_confidence_boost.is_finite() || self.high_confidence_boost < 1.0 {
            bail!("high-confidence boost {} must be at least 1", self.high_confidence_boost);
        }
        if self.floors.len() != 3 {
            bail!("expected 3 floors, got {}", self.floors.len());
        }
        if self.floors.iter().any(|&floor| !(0.0..1.0).contains(&floor))
            || self.floors.iter().sum::<f64>() >= 1.0
        {
            bail!("invalid floors {:?}", self.floors);
        }
        if self.confidence.edge_cap.is_nan() || self.confidence.edge_cap <= 0.0 {
            bail!("edge cap must be positive");
        }
        Ok(())
    }
}
impl Default for Config {
    fn default() -> Self {
        Self {
            calibration: default_calibration(),
            split: ComplementSplit::new(vec![
                vec![0.0, 0.40, 0.60],
                vec![0.55, 0.0, 0.45],
                vec![0.60, 0.40, 0.0],
            ]),
            h2h_prior: [0.40, 0.35],
            form_vote: DiffVote {
                base: [0.40, 0.28, 0.32],
                slope: [0.30, 0.10, 0.30],
            },
            venue_vote: DiffVote {
                base: [0.42, 0.27, 0.31],
                slope: [0.25, 0.08, 0.25],
            },
            high_confidence_boost: 1.3,
            floors: vec![0.02, 0.05, 0.02],
            confidence: ConfidenceWeights::default(),
        }
    }
}

fn default_calibration() -> Calibration {
    Calibration {
        weights: Weights::from_iter([
            (Source::H2h.key(), 0.20),
            (Source::Form.key(), 0.15),
            (Source::VenueForm.key(), 0.10),
            (Source::Forebet.key(), 0.15),
            (Source::Sofascore.key(), 0.10),
            (Source::Odds.key(), 0.20),
            (Source::Gemini.key(), 0.10),
        ]),
        temperature: 1.15,
    }
}

#[derive(Debug, Clone)]
pub struct Football {
    config: Config,
    extractor: FootballExtractor,
}
impl Football {
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn cast_prediction(
        &self,
        source: Source,
        (prob, score): (f64, f64),
        weight: f64,
        ballot: &mut Ballot<FootballOutcome>,
    ) {
        let favourite = FootballOutcome::from_prediction_score(score);
        ballot.cast_favourite(source.key(), favourite, prob, weight, &self.config.split);
    }
}
impl Default for Football {
    fn default() -> Self {
        Self {
            config: Config::default(),
            extractor: FootballExtractor,
        }
    }
}
impl TryFrom<Config> for Football {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: FootballExtractor,
        })
    }
}

impl Sport for Football {
    type Outcome = FootballOutcome;
    type Extractor = FootballExtractor;

    fn name(&self) -> &'static str {
        "football"
    }

    fn extractor(&self) -> &Self::Extractor {
        &self.extractor
    }

    fn default_calibration(&self) -> Calibration {
        self.config.calibration.clone()
    }

    fn vote(
        &self,
        record: &MatchRecord,
        features: &Features,
        weights: &Weights,
        ballot: &mut Ballot<FootballOutcome>,
    ) {
        if features.is_observed(H2H_WIN_RATE) {
            let focus = record.focus();
            let prior = match focus {
                Side::Home => self.config.h2h_prior[0],
                Side::Away => self.config.h2h_prior[1],
            };
            let confidence = features.value(H2H_CONFIDENCE);
            let estimate = features.value(H2H_WIN_RATE) * confidence + (1.0 - confidence) * prior;
            ballot.cast_favourite(
                Source::H2h.key(),
                FootballOutcome::win(focus),
                estimate,
                weights.get(Source::H2h.key()),
                &self.config.split,
            );
        }

        if features.is_observed(HOME_FORM) || features.is_observed(AWAY_FORM) {
            self.config.form_vote.cast(
                Source::Form,
                (features.value(HOME_FORM), features.value(AWAY_FORM)),
                weights.get(Source::Form.key()),
                ballot,
            );
        }

        if features.is_observed(HOME_VENUE_FORM) || features.is_observed(AWAY_VENUE_FORM) {
            self.config.venue_vote.cast(
                Source::VenueForm,
                (features.value(HOME_VENUE_FORM), features.value(AWAY_VENUE_FORM)),
                weights.get(Source::VenueForm.key()),
                ballot,
            );
        }

        if features.is_observed(FOREBET_PROB) {
            self.cast_prediction(
                Source::Forebet,
                (features.value(FOREBET_PROB), features.value(FOREBET_PRED)),
                weights.get(Source::Forebet.key()),
                ballot,
            );
        }

        if features.is_observed(SOFASCORE[0]) {
            ballot.cast_all(
                Source::Sofascore.key(),
                &SOFASCORE.map(|name| features.value(name)),
                weights.get(Source::Sofascore.key()),
            );
        }

        if features.is_observed(ODDS[0]) {
            ballot.cast_all(
                Source::Odds.key(),
                &ODDS.map(|name| features.value(name)),
                weights.get(Source::Odds.key()),
            );
        }

        if features.is_observed(GEMINI_CONF) {
            let boost = if features.value(GEMINI_HIGH) > 0.0 {
                self.config.high_confidence_boost
            } else {
                1.0
            };
            self.cast_prediction(
                Source::Gemini,
                (features.value(GEMINI_CONF), features.value(GEMINI_PRED)),
                weights.get(Source::Gemini.key()) * boost,
                ballot,
            );
        }
    }

    fn odds(&self, record: &MatchRecord) -> Vec<Option<f64>> {
        vec![record.home_odds, record.draw_odds, record.away_odds]
    }

    fn floors(&self) -> &[f64] {
        &self.config.floors
    }

    fn confidence_weights(&self) -> &ConfidenceWeights {
        &self.config.confidence
    }
}

#[cfg(test)]
mod tests;
