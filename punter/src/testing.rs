//! Fixtures shared by the unit tests of this crate.

use ordinalizer::Ordinal;
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::calibration::{Calibration, Weights};
use crate::ensemble::{Ballot, ComplementSplit};
use crate::features::{form_score, Coverage, FeatureExtractor, Features, FormScheme};
use crate::market::{Market, OverroundMethod};
use crate::outcome::{AsIndex, Outcome, Side};
use crate::record::MatchRecord;
use crate::sport::Sport;
use crate::value::ConfidenceWeights;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, IntoStaticStr,
)]
pub enum Tri {
    #[default]
    #[strum(serialize = "L")]
    Left,
    #[strum(serialize = "M")]
    Middle,
    #[strum(serialize = "R")]
    Right,
}
impl AsIndex for Tri {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}
impl Outcome for Tri {
    fn label(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Ordinal, EnumCount)]
enum TriGroup {
    Form,
    Odds,
}
impl AsIndex for TriGroup {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}

const FORM_SCHEME: FormScheme = FormScheme {
    win: 1.0,
    draw: 0.5,
    loss: 0.0,
    decay: 1.0,
    window: 5,
};

/// A minimal three-outcome sport: the market votes for every outcome and the home form votes for
/// [`Tri::Left`].
#[derive(Debug, Clone)]
pub struct TriSport {
    extractor: TriExtractor,
    floors: Vec<f64>,
    confidence_weights: ConfidenceWeights,
}
impl Default for TriSport {
    fn default() -> Self {
        Self {
            extractor: TriExtractor,
            floors: vec![0.02; 3],
            confidence_weights: ConfidenceWeights::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriExtractor;
impl FeatureExtractor for TriExtractor {
    fn extract(&self, record: &MatchRecord) -> Features {
        let mut features = Features::default();
        let mut coverage = Coverage::<TriGroup>::default();
        match form_score(record.form(Side::Home), &FORM_SCHEME) {
            Some(form) => {
                features.observe("form", form);
                coverage.cover(TriGroup::Form);
            }
            None => features.assume("form", 0.5),
        }
        let prices = [record.home_odds, record.draw_odds, record.away_odds];
        match Market::fit(&OverroundMethod::Multiplicative, &prices, &[None; 3]) {
            Some(market) => {
                for (name, prob) in ["odds_l", "odds_m", "odds_r"].into_iter().zip(market.probs) {
                    features.observe(name, prob);
                }
                coverage.cover(TriGroup::Odds);
            }
            None => {
                for name in ["odds_l", "odds_m", "odds_r"] {
                    features.assume(name, Tri::neutral_prior());
                }
            }
        }
        features.observe(Features::DATA_QUALITY, coverage.fraction());
        features
    }
}

impl Sport for TriSport {
    type Outcome = Tri;
    type Extractor = TriExtractor;

    fn name(&self) -> &'static str {
        "tri"
    }

    fn extractor(&self) -> &Self::Extractor {
        &self.extractor
    }

    fn default_calibration(&self) -> Calibration {
        Calibration {
            weights: Weights::from_iter([("form", 0.5), ("odds", 0.5)]),
            temperature: 1.0,
        }
    }

    fn vote(&self, _: &MatchRecord, features: &Features, weights: &Weights, ballot: &mut Ballot<Tri>) {
        if features.is_observed("form") {
            ballot.cast_favourite(
                "form",
                Tri::Left,
                features.value("form"),
                weights.get("form"),
                &ComplementSplit::even(),
            );
        }
        if features.is_observed("odds_l") {
            ballot.cast_all(
                "odds",
                &[
                    features.value("odds_l"),
                    features.value("odds_m"),
                    features.value("odds_r"),
                ],
                weights.get("odds"),
            );
        }
    }

    fn odds(&self, record: &MatchRecord) -> Vec<Option<f64>> {
        vec![record.home_odds, record.draw_odds, record.away_odds]
    }

    fn floors(&self) -> &[f64] {
        &self.floors
    }

    fn confidence_weights(&self) -> &ConfidenceWeights {
        &self.confidence_weights
    }
}
