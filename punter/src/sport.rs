//! The seam between the generic scoring core and a concrete sport.

use crate::calibration::{Calibration, Weights};
use crate::ensemble::Ballot;
use crate::features::{FeatureExtractor, Features};
use crate::outcome::Outcome;
use crate::record::MatchRecord;
use crate::value::ConfidenceWeights;

pub trait Sport: Send + Sync {
    type Outcome: Outcome;
    type Extractor: FeatureExtractor;

    fn name(&self) -> &'static str;

    fn extractor(&self) -> &Self::Extractor;

    /// Weights and temperature used when no calibration artifact is available.
    fn default_calibration(&self) -> Calibration;

    /// Casts the votes of every source that has real data in `features`.
    fn vote(
        &self,
        record: &MatchRecord,
        features: &Features,
        weights: &Weights,
        ballot: &mut Ballot<Self::Outcome>,
    );

    /// Decimal prices for each outcome, indexed by ordinal.
    fn odds(&self, record: &MatchRecord) -> Vec<Option<f64>>;

    /// Lower bounds applied to the raw probabilities before renormalisation, indexed by ordinal.
    fn floors(&self) -> &[f64];

    fn confidence_weights(&self) -> &ConfidenceWeights;
}
