use ordinalizer::Ordinal;
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

use punter::outcome::{AsIndex, Outcome, Side};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, IntoStaticStr,
)]
pub enum FootballOutcome {
    #[default]
    #[strum(serialize = "1")]
    Home,
    #[strum(serialize = "X")]
    Draw,
    #[strum(serialize = "2")]
    Away,
}
impl AsIndex for FootballOutcome {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}
impl FootballOutcome {
    pub fn win(side: Side) -> Self {
        match side {
            Side::Home => FootballOutcome::Home,
            Side::Away => FootballOutcome::Away,
        }
    }

    /// Favourite implied by a prediction score, where 1 denotes a home win and 0 an away win.
    pub fn from_prediction_score(score: f64) -> Self {
        if score > 0.7 {
            FootballOutcome::Home
        } else if score < 0.3 {
            FootballOutcome::Away
        } else {
            FootballOutcome::Draw
        }
    }

    pub fn prediction_score(&self) -> f64 {
        match self {
            FootballOutcome::Home => 1.0,
            FootballOutcome::Draw => 0.5,
            FootballOutcome::Away => 0.0,
        }
    }
}
impl Outcome for FootballOutcome {
    fn label(&self) -> &'static str {
        self.into()
    }
}

/// A source of evidence, named by its calibration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Source {
    H2h,
    Form,
    VenueForm,
    Forebet,
    Sofascore,
    Odds,
    Gemini,
}
impl Source {
    pub fn key(&self) -> &'static str {
        self.into()
    }
}

/// Feature groups counted towards data quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, EnumCount, EnumIter)]
pub enum Group {
    H2h,
    HomeForm,
    AwayForm,
    HomeVenueForm,
    AwayVenueForm,
    Forebet,
    CommunityVote,
    Odds,
    Gemini,
}
impl AsIndex for Group {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}

#[cfg(test)]
mod tests {
    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn outcome_labels() {
        assert_eq!(
            vec!["1", "X", "2"],
            FootballOutcome::iter()
                .map(|outcome| outcome.label())
                .collect::<Vec<_>>()
        );
        assert_eq!(Some(FootballOutcome::Draw), FootballOutcome::from_label(" x "));
        assert_eq!(None, FootballOutcome::from_label("draw"));
    }

    #[test]
    fn prediction_scores() {
        for outcome in FootballOutcome::iter() {
            assert_eq!(
                outcome,
                FootballOutcome::from_prediction_score(outcome.prediction_score())
            );
        }
        assert_eq!(FootballOutcome::Draw, FootballOutcome::from_prediction_score(0.7));
        assert_eq!(FootballOutcome::Draw, FootballOutcome::from_prediction_score(0.3));
    }

    #[test]
    fn source_keys() {
        assert_eq!(
            vec!["h2h", "form", "venue_form", "forebet", "sofascore", "odds", "gemini"],
            Source::iter().map(|source| source.key()).collect::<Vec<_>>()
        );
        assert_eq!(9, Group::COUNT);
    }
}
