//! Tennis feature extraction. Every feature is expressed from player A's perspective, except the
//! per-player form, streak and surface features.

use punter::features::{
    form_score, h2h_rate, ranking_gap, streak, Coverage, FeatureExtractor, Features, FormScheme,
    H2hScheme,
};
use punter::market::{Market, OverroundMethod};
use punter::outcome::Side;
use punter::record::MatchRecord;

use crate::domain::Group;

pub const H2H_WIN_RATE_A: &str = "h2h_win_rate_a";
pub const H2H_COUNT: &str = "h2h_count";
pub const FORM_A: &str = "form_a";
pub const FORM_B: &str = "form_b";
pub const STREAK_A: &str = "streak_a";
pub const STREAK_B: &str = "streak_b";
pub const SURFACE_WR_A: &str = "surface_wr_a";
pub const SURFACE_WR_B: &str = "surface_wr_b";
pub const RANKING_ADVANTAGE: &str = "ranking_advantage";
pub const ODDS_PROB_A: &str = "odds_prob_a";
pub const ODDS_PROB_B: &str = "odds_prob_b";

pub const H2H_SCHEME: H2hScheme = H2hScheme {
    decay: 0.9,
    draw_credit: None,
    full_sample: 3,
    window: 10,
};

/// Draws do not occur in tennis; a recorded draw counts as a loss.
pub const FORM_SCHEME: FormScheme = FormScheme {
    win: 1.0,
    draw: 0.0,
    loss: 0.0,
    decay: 0.85,
    window: 10,
};

/// Ranking gap at which the ranking advantage reaches one half.
const RANKING_SCALE: f64 = 20.0;

const FULL_STREAK: f64 = 5.0;

#[derive(Debug, Clone, Default)]
pub struct TennisExtractor;

impl FeatureExtractor for TennisExtractor {
    fn extract(&self, record: &MatchRecord) -> Features {
        let mut features = Features::default();
        let mut coverage = Coverage::<Group>::default();

        extract_h2h(record, &mut features, &mut coverage);
        extract_form(record, &mut features, &mut coverage);
        extract_surface(record, &mut features, &mut coverage);
        extract_ranking(record, &mut features, &mut coverage);
        extract_odds(record, &mut features, &mut coverage);

        features.observe(Features::DATA_QUALITY, coverage.fraction());
        features
    }
}

fn extract_h2h(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    let encounters = record.h2h_last5.as_deref().unwrap_or_default();
    let rate = record
        .team(Side::Home)
        .and_then(|player_a| h2h_rate(encounters, player_a, &H2H_SCHEME));
    if let Some(rate) = rate {
        features.observe(H2H_WIN_RATE_A, rate.shrunk(0.5));
        features.observe(H2H_COUNT, f64::min(rate.counted as f64 / 5.0, 1.0));
        coverage.cover(Group::H2h);
        return;
    }

    // fall back to the raw win counts
    let wins_a = record.h2h_wins(Side::Home).unwrap_or(0.0).max(0.0);
    let wins_b = record.h2h_wins(Side::Away).unwrap_or(0.0).max(0.0);
    let total = wins_a + wins_b;
    if total > 0.0 {
        features.observe(H2H_WIN_RATE_A, wins_a / total);
        features.observe(H2H_COUNT, f64::min(total / 5.0, 1.0));
        coverage.cover(Group::H2h);
    } else {
        features.assume(H2H_WIN_RATE_A, 0.5);
        features.assume(H2H_COUNT, 0.0);
    }
}

fn extract_form(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    let players = [
        (Side::Home, FORM_A, STREAK_A, Group::FormA),
        (Side::Away, FORM_B, STREAK_B, Group::FormB),
    ];
    for (side, form_name, streak_name, group) in players {
        let form = record.form(side);
        match form_score(form, &FORM_SCHEME) {
            Some(score) => {
                features.observe(form_name, score);
                features.observe(
                    streak_name,
                    f64::min(streak(form) as f64 / FULL_STREAK, 1.0),
                );
                coverage.cover(group);
            }
            None => {
                features.assume(form_name, 0.5);
                features.assume(streak_name, 0.0);
            }
        }
    }
}

fn extract_surface(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    match (record.surface_rate(Side::Home), record.surface_rate(Side::Away)) {
        (Some(rate_a), Some(rate_b)) => {
            features.observe(SURFACE_WR_A, rate_a);
            features.observe(SURFACE_WR_B, rate_b);
            coverage.cover(Group::Surface);
        }
        _ => {
            features.assume(SURFACE_WR_A, 0.5);
            features.assume(SURFACE_WR_B, 0.5);
        }
    }
}

fn extract_ranking(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    match (record.ranking(Side::Home), record.ranking(Side::Away)) {
        (Some(ranking_a), Some(ranking_b)) => {
            features.observe(
                RANKING_ADVANTAGE,
                ranking_gap(ranking_a, ranking_b, RANKING_SCALE),
            );
            coverage.cover(Group::Ranking);
        }
        _ => features.assume(RANKING_ADVANTAGE, 0.0),
    }
}

fn extract_odds(record: &MatchRecord, features: &mut Features, coverage: &mut Coverage<Group>) {
    let prices = [record.home_odds, record.away_odds];
    match Market::fit(&OverroundMethod::Multiplicative, &prices, &[None, None]) {
        Some(market) => {
            features.observe(ODDS_PROB_A, market.probs[0]);
            features.observe(ODDS_PROB_B, market.probs[1]);
            coverage.cover(Group::Odds);
        }
        None => {
            features.assume(ODDS_PROB_A, 0.5);
            features.assume(ODDS_PROB_B, 0.5);
        }
    }
}
