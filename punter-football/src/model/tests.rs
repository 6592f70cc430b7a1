use std::iter::repeat;

use assert_float_eq::*;
use serde_json::{json, Value};

use punter::model::ScoringModel;
use punter_testing::{assert_distribution, assert_slice_f64_absolute};

use super::*;

fn record(value: Value) -> MatchRecord {
    MatchRecord::from_value(&value).unwrap()
}

fn model() -> ScoringModel<Football> {
    ScoringModel::with_defaults(Football::default())
}

fn encounters(home_wins: usize, away_wins: usize) -> Value {
    repeat("2:0")
        .take(home_wins)
        .chain(repeat("0-1").take(away_wins))
        .enumerate()
        .map(|(index, score)| {
            let (home, away, score) = if index % 2 == 0 {
                ("Rovers", "United", score.to_string())
            } else {
                // Rovers travelling; mirror the score
                let mirrored: String = score.chars().rev().collect();
                ("United FC", "Rovers", mirrored)
            };
            json!({
                "date": format!("0{}.01.2024", 9 - index),
                "home": home,
                "away": away,
                "score": score,
            })
        })
        .collect()
}

#[test]
fn strong_home_favourite() {
    let result = model().score(&record(json!({
        "home_team": "Rovers",
        "away_team": "United",
        "h2h_last5": encounters(5, 0),
        "home_form": "W,W,W,W,W",
        "home_odds": 1.50,
        "draw_odds": 4.00,
        "away_odds": 6.00,
    })));
    assert_eq!(FootballOutcome::Home, result.pick.outcome);
    assert_eq!(Some(1.5), result.pick.odds);
    assert!(result.ev() > 0.0);
    assert!(result.prob(FootballOutcome::Home) > 0.65);
    assert_distribution(&result.raw_probs, 1e-9);
    assert_distribution(&result.calibrated_probs, 1e-9);
    // H2H, home form and odds
    assert_float_absolute_eq!(3.0 / 9.0, result.data_quality, 1e-12);
}

#[test]
fn empty_record_scores_neutral_prior() {
    let result = model().score(&record(json!({})));
    assert_slice_f64_absolute(&[1.0 / 3.0; 3], &result.raw_probs, 1e-12);
    assert_slice_f64_absolute(&[1.0 / 3.0; 3], &result.calibrated_probs, 1e-12);
    assert_eq!(0.0, result.data_quality);
    assert_eq!(FootballOutcome::Home, result.pick.outcome);
    assert_eq!(None, result.pick.odds);
    assert_eq!(0.0, result.ev());
    assert_eq!("football", result.sport);
}

#[test]
fn unit_odds_excluded_from_pick() {
    let result = model().score(&record(json!({
        "home_odds": 1.0,
        "draw_odds": 3.5,
        "away_odds": 4.0,
    })));
    // the market is unusable without a valid home price, so no source votes
    assert_slice_f64_absolute(&[1.0 / 3.0; 3], &result.calibrated_probs, 1e-12);
    assert_eq!(FootballOutcome::Away, result.pick.outcome);
    assert_eq!(Some(4.0), result.pick.odds);
    assert_float_absolute_eq!(1.0 / 3.0, result.ev(), 1e-9);
}

#[test]
fn h2h_evidence_is_monotonic() {
    let model = model();
    let mut previous = 0.0;
    for home_wins in 0..=5 {
        let result = model.score(&record(json!({
            "home_team": "Rovers",
            "away_team": "United",
            "h2h_last5": encounters(home_wins, 5 - home_wins),
            "home_odds": 2.5,
            "draw_odds": 3.2,
            "away_odds": 2.9,
        })));
        let prob = result.prob(FootballOutcome::Home);
        assert!(prob >= previous, "{prob} < {previous} with {home_wins} home wins");
        previous = prob;
    }
}

#[test]
fn h2h_from_away_focus() {
    let result = model().score(&record(json!({
        "home_team": "Rovers",
        "away_team": "United",
        "focus_team": "away",
        "h2h_last5": encounters(0, 5),
    })));
    let h2h: Vec<_> = result
        .contributions
        .iter()
        .filter(|contribution| contribution.source == "h2h")
        .collect();
    assert_eq!(3, h2h.len());
    assert_eq!("2", h2h[2].outcome);
    assert_float_absolute_eq!(1.0, h2h[2].estimate, 1e-12);
    assert_eq!(FootballOutcome::Away, result.pick.outcome);
}

#[test]
fn thin_h2h_shrinks_toward_prior() {
    let result = model().score(&record(json!({
        "home_team": "Rovers",
        "away_team": "United",
        "h2h_last5": encounters(1, 0),
    })));
    let confidence = 1.0 / 2.71;
    let expected = confidence + (1.0 - confidence) * 0.40;
    assert_float_absolute_eq!(expected, result.contributions[0].estimate, 1e-12);
    assert_float_absolute_eq!((1.0 - expected) * 0.40, result.contributions[1].estimate, 1e-12);
    assert_float_absolute_eq!((1.0 - expected) * 0.60, result.contributions[2].estimate, 1e-12);
}

#[test]
fn high_confidence_prediction_boosted() {
    let result = model().score(&record(json!({
        "gemini_prediction": "X",
        "gemini_confidence": 60,
        "gemini_recommendation": "HIGH",
    })));
    assert_eq!(3, result.contributions.len());
    for contribution in &result.contributions {
        assert_eq!("gemini", contribution.source);
        assert_float_absolute_eq!(0.13, contribution.weight, 1e-12);
    }
    // a draw favourite splits its complement 55/45 between home and away
    assert_float_absolute_eq!(0.4 * 0.55, result.contributions[0].estimate, 1e-12);
    assert_float_absolute_eq!(0.6, result.contributions[1].estimate, 1e-12);
    assert_float_absolute_eq!(0.4 * 0.45, result.contributions[2].estimate, 1e-12);
    assert_eq!(FootballOutcome::Draw, result.pick.outcome);
}

#[test]
fn every_source_votes() {
    let result = model().score(&record(json!({
        "home_team": "Rovers",
        "away_team": "United",
        "h2h_last5": encounters(3, 2),
        "home_form_overall": ["W", "D", "L", "W"],
        "away_form_overall": "L,L,D",
        "home_form_home": "W,W",
        "away_form_away": "['L', 'D']",
        "forebet_prediction": "1",
        "forebet_probability": "55",
        "sofascore_home_win_prob": 61,
        "sofascore_draw_prob": 22,
        "sofascore_away_win_prob": 17,
        "home_odds": "1.95",
        "draw_odds": 3.6,
        "away_odds": 4.2,
        "gemini_prediction": "1",
        "gemini_confidence": 64,
        "gemini_recommendation": "MEDIUM",
    })));
    assert_eq!(1.0, result.data_quality);
    assert_eq!(21, result.contributions.len());
    assert_distribution(&result.raw_probs, 1e-9);
    assert_distribution(&result.calibrated_probs, 1e-9);
    assert!((0.0..=100.0).contains(&result.confidence));
    assert!(result.prob(FootballOutcome::Home) > result.prob(FootballOutcome::Away));
}

#[test]
fn draw_floor_applied() {
    let result = model().score(&record(json!({
        "forebet_prediction": "1",
        "forebet_probability": 100,
    })));
    // estimates (1, 0, 0) are floored to (1, 0.05, 0.02)
    assert_slice_f64_absolute(&[1.0 / 1.07, 0.05 / 1.07, 0.02 / 1.07], &result.raw_probs, 1e-12);
}

#[test]
fn idempotent() {
    let model = model();
    let record = record(json!({
        "home_team": "Rovers",
        "away_team": "United",
        "h2h_last5": encounters(2, 2),
        "home_form": "W,L,D",
        "home_odds": 2.4, "draw_odds": 3.3, "away_odds": 3.0,
    }));
    assert_eq!(model.score(&record), model.score(&record));
}

#[test]
fn decimal_comma_odds() {
    let result = model().score(&record(json!({
        "home_odds": "1,85",
        "draw_odds": "3,40",
        "away_odds": "4,20",
    })));
    let expected = model().score(&record(json!({
        "home_odds": 1.85,
        "draw_odds": 3.40,
        "away_odds": 4.20,
    })));
    assert_eq!(expected.calibrated_probs, result.calibrated_probs);
    assert_eq!(expected.pick, result.pick);
    assert!(result.pick.odds.unwrap() < 5.0);
    assert!(result.ev() < 1.0);
    assert!(result.pick.valuation.kelly < 25.0);
}

#[test]
fn config_validation() {
    assert!(Football::try_from(Config::default()).is_ok());

    let mut config = Config::default();
    config.calibration.weights = Weights::from_iter([("odds", 1.0)]);
    assert_eq!(
        "missing weight for h2h",
        Football::try_from(config).err().unwrap().to_string()
    );

    let config = Config {
        split: ComplementSplit::new(vec![
            vec![0.0, 0.5, 0.6],
            vec![0.5, 0.0, 0.5],
            vec![0.5, 0.5, 0.0],
        ]),
        ..Config::default()
    };
    assert!(Football::try_from(config).is_err());

    let config = Config {
        floors: vec![0.5, 0.5, 0.1],
        ..Config::default()
    };
    assert!(Football::try_from(config).is_err());

    let config = Config {
        form_vote: DiffVote {
            base: [0.4, 0.28, 0.32],
            slope: [0.7, 0.1, 0.3],
        },
        ..Config::default()
    };
    assert!(Football::try_from(config).is_err());
}
