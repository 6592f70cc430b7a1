//! The tennis voting policy. Every source estimates the probability of player A winning; player B
//! receives the complement.

use anyhow::bail;
use strum::IntoEnumIterator;

use punter::calibration::{Calibration, Weights};
use punter::ensemble::{Ballot, ComplementSplit};
use punter::features::Features;
use punter::model::ScoredResult;
use punter::record::MatchRecord;
use punter::sport::Sport;
use punter::value::ConfidenceWeights;

use crate::domain::{Player, Source};
use crate::features::{
    TennisExtractor, FORM_A, FORM_B, H2H_WIN_RATE_A, ODDS_PROB_A, ODDS_PROB_B,
    RANKING_ADVANTAGE, STREAK_A, STREAK_B, SURFACE_WR_A, SURFACE_WR_B,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub calibration: Calibration,
    /// Bounds that the form, surface and ranking estimates are clamped to.
    pub estimate_bounds: (f64, f64),
    /// Adjustment to the form estimate per unit of streak difference.
    pub streak_bonus: f64,
    /// Maximum departure of the ranking estimate from an even contest.
    pub ranking_reach: f64,
    pub floors: Vec<f64>,
    pub confidence: ConfidenceWeights,
    /// Advanced score at or above which a match qualifies for selection.
    pub qualification_threshold: f64,
}
impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.calibration.validate()?;
        for source in Source::iter() {
            if !self.calibration.weights.contains(source.key()) {
                bail!("missing weight for {source}");
            }
        }
        let (lower, upper) = self.estimate_bounds;
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower > upper {
            bail!("invalid estimate bounds {lower}..={upper}");
        }
        if !self.streak_bonus.is_finite() || self.streak_bonus < 0.0 {
            bail!("invalid streak bonus {}", self.streak_bonus);
        }
        if !(0.0..=0.5).contains(&self.ranking_reach) {
            bail!("ranking reach {} outside [0, 0.5]", self.ranking_reach);
        }
        if self.floors.len() != 2 {
            bail!("expected 2 floors, got {}", self.floors.len());
        }
        if self.floors.iter().any(|&floor| !(0.0..1.0).contains(&floor))
            || self.floors.iter().sum::<f64>() >= 1.0
        {
            bail!("invalid floors {:?}", self.floors);
        }
        if self.confidence.edge_cap.is_nan() || self.confidence.edge_cap <= 0.0 {
            bail!("edge cap must be positive");
        }
        if !(0.0..=100.0).contains(&self.qualification_threshold) {
            bail!(
                "qualification threshold {} outside [0, 100]",
                self.qualification_threshold
            );
        }
        Ok(())
    }
}
impl Default for Config {
    fn default() -> Self {
        Self {
            calibration: default_calibration(),
            estimate_bounds: (0.05, 0.95),
            streak_bonus: 0.05,
            ranking_reach: 0.35,
            floors: vec![0.02, 0.02],
            confidence: ConfidenceWeights {
                edge_cap: 20.0,
                penalise_negative_edge: false,
                ..ConfidenceWeights::default()
            },
            qualification_threshold: 45.0,
        }
    }
}

fn default_calibration() -> Calibration {
    Calibration {
        weights: Weights::from_iter([
            (Source::H2h.key(), 0.30),
            (Source::Form.key(), 0.25),
            (Source::SurfaceForm.key(), 0.20),
            (Source::Ranking.key(), 0.15),
            (Source::Odds.key(), 0.10),
        ]),
        temperature: 1.10,
    }
}

/// Separation between the two calibrated probabilities on a `[0, 100]` scale, discounted by up to
/// half for missing data.
pub fn advanced_score(result: &ScoredResult<Player>) -> f64 {
    let separation = (result.prob(Player::A) - result.prob(Player::B)).abs() * 100.0;
    let score = separation * (0.5 + 0.5 * result.data_quality);
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct Tennis {
    config: Config,
    extractor: TennisExtractor,
    split: ComplementSplit<Player>,
}
impl Tennis {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the match clears the qualification threshold for selection.
    pub fn qualifies(&self, result: &ScoredResult<Player>) -> bool {
        advanced_score(result) >= self.config.qualification_threshold
    }

    fn bounded(&self, estimate: f64) -> f64 {
        let (lower, upper) = self.config.estimate_bounds;
        estimate.clamp(lower, upper)
    }

    fn cast_player_a(
        &self,
        source: Source,
        estimate: f64,
        weights: &Weights,
        ballot: &mut Ballot<Player>,
    ) {
        ballot.cast_favourite(
            source.key(),
            Player::A,
            estimate,
            weights.get(source.key()),
            &self.split,
        );
    }
}
impl Default for Tennis {
    fn default() -> Self {
        Self {
            config: Config::default(),
            extractor: TennisExtractor,
            split: ComplementSplit::even(),
        }
    }
}
impl TryFrom<Config> for Tennis {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }
}

/// Share of `own` in `own + other`, or an even split when both are zero.
fn share(own: f64, other: f64) -> f64 {
    let total = own + other;
    if total > 0.0 {
        own / total
    } else {
        0.5
    }
}

impl Sport for Tennis {
    type Outcome = Player;
    type Extractor = TennisExtractor;

    fn name(&self) -> &'static str {
        "tennis"
    }

    fn extractor(&self) -> &Self::Extractor {
        &self.extractor
    }

    fn default_calibration(&self) -> Calibration {
        self.config.calibration.clone()
    }

    fn vote(
        &self,
        _: &MatchRecord,
        features: &Features,
        weights: &Weights,
        ballot: &mut Ballot<Player>,
    ) {
        if features.is_observed(H2H_WIN_RATE_A) {
            self.cast_player_a(Source::H2h, features.value(H2H_WIN_RATE_A), weights, ballot);
        }

        if features.is_observed(FORM_A) || features.is_observed(FORM_B) {
            let streak_diff = features.value(STREAK_A) - features.value(STREAK_B);
            let estimate = share(features.value(FORM_A), features.value(FORM_B))
                + streak_diff * self.config.streak_bonus;
            self.cast_player_a(Source::Form, self.bounded(estimate), weights, ballot);
        }

        if features.is_observed(SURFACE_WR_A) {
            let estimate = share(features.value(SURFACE_WR_A), features.value(SURFACE_WR_B));
            self.cast_player_a(Source::SurfaceForm, self.bounded(estimate), weights, ballot);
        }

        if features.is_observed(RANKING_ADVANTAGE) {
            let estimate = 0.5 + features.value(RANKING_ADVANTAGE) * self.config.ranking_reach;
            self.cast_player_a(Source::Ranking, self.bounded(estimate), weights, ballot);
        }

        if features.is_observed(ODDS_PROB_A) {
            ballot.cast_all(
                Source::Odds.key(),
                &[features.value(ODDS_PROB_A), features.value(ODDS_PROB_B)],
                weights.get(Source::Odds.key()),
            );
        }
    }

    fn odds(&self, record: &MatchRecord) -> Vec<Option<f64>> {
        vec![record.home_odds, record.away_odds]
    }

    fn floors(&self) -> &[f64] {
        &self.config.floors
    }

    fn confidence_weights(&self) -> &ConfidenceWeights {
        &self.config.confidence
    }
}
