//! Football feature extraction.

use punter::features::{
    form_score, h2h_rate, streak, vote_shares, Coverage, FeatureExtractor, Features, FormScheme,
    H2hScheme,
};
use punter::market::{Market, OverroundMethod};
use punter::outcome::{Outcome, Side};
use punter::record::{MatchRecord, Prediction};

use crate::domain::{FootballOutcome, Group};

pub const H2H_WIN_RATE: &str = "h2h_win_rate";
pub const H2H_CONFIDENCE: &str = "h2h_confidence";
pub const H2H_COUNT: &str = "h2h_count";
pub const HOME_FORM: &str = "home_form";
pub const AWAY_FORM: &str = "away_form";
pub const HOME_STREAK: &str = "home_streak";
pub const AWAY_STREAK: &str = "away_streak";
pub const HOME_VENUE_FORM: &str = "home_venue_form";
pub const AWAY_VENUE_FORM: &str = "away_venue_form";
pub const FOREBET_PROB: &str = "forebet_prob";
pub const FOREBET_PRED: &str = "forebet_pred";
pub const SOFASCORE: [&str; 3] = ["ss_home", "ss_draw", "ss_away"];
pub const ODDS: [&str; 3] = ["odds_home", "odds_draw", "odds_away"];
pub const GEMINI_CONF: &str = "gemini_conf";
pub const GEMINI_PRED: &str = "gemini_pred";
pub const GEMINI_HIGH: &str = "gemini_high";

pub const H2H_SCHEME: H2hScheme = H2hScheme {
    decay: 0.9,
    draw_credit: Some(0.5),
    full_sample: 3,
    window: 10,
};

pub const FORM_SCHEME: FormScheme = FormScheme {
    win: 3.0,
    draw: 1.0,
    loss: 0.0,
    decay: 0.85,
    window: 6,
};

/// Consecutive wins at which the streak feature saturates.
const FULL_STREAK: f64 = 5.0;

/// Raw implied probability assumed for the draw when only the home and away prices are quoted.
const DRAW_FILLER: f64 = 0.25;

/// Market probabilities reported when no usable prices are quoted.
pub const MARKET_PRIOR: [f64; 3] = [0.40, 0.27, 0.33];

const SOFASCORE_PRIOR: [f64; 3] = [0.33, 0.34, 0.33];

#[derive(Debug, Clone, Default)]
pub struct FootballExtractor;

impl FeatureExtractor for FootballExtractor {
    fn extract(&self, record: &MatchRecord) -> Features {
        let mut features = Features::default();
        let mut coverage = Coverage::<Group>::default();

        extract_h2h(record, &mut features, &mut coverage);
        extract_form(record, &mut features, &mut coverage);
        extract_predictions(record, &mut features, &mut coverage);
        extract_community_vote(record, &mut features, &mut coverage);
        extract_odds(record, &mut features, &mut coverage);

        features.observe(Features::DATA_QUALITY, coverage.fraction());
        features
    }
}

fn extract_h2h(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    let encounters = record.h2h_last5.as_deref().unwrap_or_default();
    let rate = record
        .team(record.focus())
        .and_then(|focus| h2h_rate(encounters, focus, &H2H_SCHEME));
    match rate {
        Some(rate) => {
            features.observe(H2H_WIN_RATE, rate.rate);
            features.observe(H2H_CONFIDENCE, rate.confidence);
            features.observe(H2H_COUNT, f64::min(rate.counted as f64 / 5.0, 1.0));
            coverage.cover(Group::H2h);
        }
        None => {
            features.assume(H2H_WIN_RATE, 0.5);
            features.assume(H2H_CONFIDENCE, 0.0);
            features.assume(H2H_COUNT, 0.0);
        }
    }
}

fn extract_form(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    let sides = [
        (Side::Home, HOME_FORM, HOME_STREAK, HOME_VENUE_FORM, Group::HomeForm, Group::HomeVenueForm),
        (Side::Away, AWAY_FORM, AWAY_STREAK, AWAY_VENUE_FORM, Group::AwayForm, Group::AwayVenueForm),
    ];
    for (side, form_name, streak_name, venue_name, form_group, venue_group) in sides {
        let form = record.form(side);
        let overall = form_score(form, &FORM_SCHEME);
        match overall {
            Some(score) => {
                features.observe(form_name, score);
                features.observe(
                    streak_name,
                    f64::min(streak(form) as f64 / FULL_STREAK, 1.0),
                );
                coverage.cover(form_group);
            }
            None => {
                features.assume(form_name, 0.5);
                features.assume(streak_name, 0.0);
            }
        }

        // venue form falls back to the overall form without counting towards data quality
        match form_score(record.venue_form(side), &FORM_SCHEME) {
            Some(score) => {
                features.observe(venue_name, score);
                coverage.cover(venue_group);
            }
            None => match overall {
                Some(score) => features.observe(venue_name, score),
                None => features.assume(venue_name, 0.5),
            },
        }
    }
}

/// Scores a prediction label: 1 for a home win, 0.5 for a draw, 0 for an away win. Unrecognised
/// labels score as a draw.
fn prediction_score(label: &str) -> f64 {
    FootballOutcome::from_label(label)
        .map(|outcome| outcome.prediction_score())
        .unwrap_or(0.5)
}

fn confidence(prediction: &Prediction) -> f64 {
    (prediction.confidence / 100.0).clamp(0.0, 1.0)
}

fn extract_predictions(
    record: &MatchRecord,
    features: &mut Features,
    coverage: &mut Coverage<Group>,
) {
    match record.forebet() {
        Some(forebet) => {
            features.observe(FOREBET_PROB, confidence(&forebet));
            features.observe(FOREBET_PRED, prediction_score(&forebet.label));
            coverage.cover(Group::Forebet);
        }
        None => {
            features.assume(FOREBET_PROB, 0.5);
            features.assume(FOREBET_PRED, 0.5);
        }
    }

    match record.gemini() {
        Some(gemini) => {
            // only the leading symbol of the label is significant, e.g. "1 (home win)"
            let label = gemini.label.trim().get(..1).unwrap_or_default();
            features.observe(GEMINI_CONF, confidence(&gemini));
            features.observe(GEMINI_PRED, prediction_score(label));
            features.observe(GEMINI_HIGH, if gemini.high { 1.0 } else { 0.0 });
            coverage.cover(Group::Gemini);
        }
        None => {
            features.assume(GEMINI_CONF, 0.5);
            features.assume(GEMINI_PRED, 0.5);
            features.assume(GEMINI_HIGH, 0.0);
        }
    }
}

fn extract_community_vote(
    record: &MatchRecord,
    features: &mut Features,
    coverage: &mut Coverage<Group>,
) {
    match vote_shares(&record.community_vote()) {
        Some(shares) => {
            for (name, share) in SOFASCORE.into_iter().zip(shares) {
                features.observe(name, share);
            }
            coverage.cover(Group::CommunityVote);
        }
        None => {
            for (name, prior) in SOFASCORE.into_iter().zip(SOFASCORE_PRIOR) {
                features.assume(name, prior);
            }
        }
    }
}

fn extract_odds(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    let prices = [record.home_odds, record.draw_odds, record.away_odds];
    let fillers = [None, Some(DRAW_FILLER), None];
    match Market::fit(&OverroundMethod::Multiplicative, &prices, &fillers) {
        Some(market) => {
            for (name, prob) in ODDS.into_iter().zip(market.probs) {
                features.observe(name, prob);
            }
            coverage.cover(Group::Odds);
        }
        None => {
            for (name, prior) in ODDS.into_iter().zip(MARKET_PRIOR) {
                features.assume(name, prior);
            }
        }
    }
}
