use std::fs;

use assert_float_eq::*;
use punter_testing::{assert_distribution, assert_slice_f64_absolute};
use serde_json::json;

use super::*;
use crate::calibration::{save_calibration, Weights};
use crate::backtest::Metrics;
use crate::file::tests::scratch_dir;
use crate::record::MatchRecord;
use crate::testing::{Tri, TriSport};

fn record(value: serde_json::Value) -> MatchRecord {
    MatchRecord::from_value(&value).unwrap()
}

fn model() -> ScoringModel<TriSport> {
    ScoringModel::with_defaults(TriSport::default())
}

#[test]
fn empty_record_scores_neutral_prior() {
    let result = model().score(&record(json!({})));
    assert_slice_f64_absolute(&[1.0 / 3.0; 3], &result.raw_probs, 1e-12);
    assert_slice_f64_absolute(&[1.0 / 3.0; 3], &result.calibrated_probs, 1e-12);
    assert_eq!(0.0, result.data_quality);
    assert_eq!(Tri::Left, result.pick.outcome);
    assert_eq!(None, result.pick.odds);
    assert_eq!(0.0, result.ev());
    assert!(result.contributions.is_empty());
    assert_float_absolute_eq!(40.0 / 3.0, result.confidence, 1e-9);
    assert_eq!("tri", result.sport);
}

#[test]
fn odds_only() {
    let result = model().score(&record(json!({
        "home_team": "Left FC",
        "away_team": "Right FC",
        "home_odds": 2.0,
        "draw_odds": "4.0",
        "away_odds": 4.0,
    })));
    assert_slice_f64_absolute(&[0.5, 0.25, 0.25], &result.raw_probs, 1e-9);
    // logits 0, -ln 3, -ln 3 under unit temperature
    assert_slice_f64_absolute(&[0.6, 0.2, 0.2], &result.calibrated_probs, 1e-9);
    assert_eq!(Tri::Left, result.pick.outcome);
    assert_eq!(Some(2.0), result.pick.odds);
    assert_float_absolute_eq!(0.2, result.ev(), 1e-9);
    assert_float_absolute_eq!(10.0, result.pick.valuation.edge, 1e-9);
    assert_eq!(0.5, result.data_quality);
    assert_eq!(3, result.contributions.len());
    assert_eq!("Left FC", result.home_team);
}

#[test]
fn floors_applied_before_renormalisation() {
    let result = model().score(&record(json!({
        "home_odds": 1.01,
        "draw_odds": 500.0,
        "away_odds": 500.0,
    })));
    assert_distribution(&result.raw_probs, 1e-9);
    assert!(result.raw_probs[1] >= 0.02 / (1.0 + 0.04) - 1e-12);
    assert_distribution(&result.calibrated_probs, 1e-9);
}

#[test]
fn zero_weights_score_neutral_prior() {
    let sport = TriSport::default();
    let calibration = Calibration {
        weights: Weights::from_iter([("form", 0.0), ("odds", 0.0)]),
        temperature: 1.0,
    };
    let model = ScoringModel::new(sport, calibration);
    let result = model.score(&record(json!({
        "home_odds": 2.0, "draw_odds": 4.0, "away_odds": 4.0, "home_form": "W W W",
    })));
    assert_slice_f64_absolute(&[1.0 / 3.0; 3], &result.raw_probs, 1e-12);
    assert!(result.contributions.is_empty());
    assert_eq!(1.0, result.data_quality);
}

#[test]
fn invalid_temperature_falls_back_to_default() {
    for temperature in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let calibration = Calibration {
            weights: Weights::from_iter([("odds", 1.0)]),
            temperature,
        };
        let model = ScoringModel::new(TriSport::default(), calibration);
        assert_eq!(1.0, model.calibration().temperature);
        assert_eq!(1.0, model.calibration().weights.get("odds"));
    }
}

#[test]
fn idempotent() {
    let model = model();
    let record = record(json!({
        "home_form": ["W", "L", "D"],
        "home_odds": 2.5, "draw_odds": 3.2, "away_odds": 2.9,
    }));
    assert_eq!(model.score(&record), model.score(&record));
}

#[test]
fn score_matches_sorted_by_ev() {
    let records = vec![
        record(json!({})),
        record(json!({"home_odds": 2.0, "draw_odds": 4.0, "away_odds": 4.0})),
        record(json!({"home_form": "W W W", "home_odds": 3.0, "draw_odds": 3.0, "away_odds": 3.0})),
        record(json!({"home_odds": 1.5, "draw_odds": 4.5, "away_odds": 7.0})),
    ];
    let results = model().score_matches(&records);
    assert_eq!(4, results.len());
    for pair in results.windows(2) {
        assert!(pair[0].ev() >= pair[1].ev());
    }
}

#[test]
fn report_flattens_probabilities() {
    let result = model().score(&record(json!({
        "home_team": "Left FC",
        "home_odds": 2.0, "draw_odds": 4.0, "away_odds": 4.0,
    })));
    let report = result.report();
    assert_eq!(0.6, report.probs["prob_L"]);
    assert_eq!(0.2, report.probs["prob_M"]);
    assert_eq!("L", report.best_pick);
    assert_eq!(0.2, report.ev);
    assert_eq!(10.0, report.edge);
    assert_eq!(0.5, report.data_quality);

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(json!(0.6), value["prob_L"]);
    assert_eq!(json!("Left FC"), value["home_team"]);
    assert_eq!(json!(2.0), value["best_odds"]);
    assert_eq!(json!(0.5), value["features"]["_data_quality"]);
    assert_eq!(json!("odds"), value["contributions"][0]["source"]);
}

#[test]
fn load_falls_back_to_defaults() {
    let dir = scratch_dir("model-load");
    let model = ScoringModel::load(TriSport::default(), dir.join("absent.json"));
    assert_eq!(&TriSport::default().default_calibration(), model.calibration());

    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("garbage.json");
    fs::write(&path, "{ not json").unwrap();
    let model = ScoringModel::load(TriSport::default(), &path);
    assert_eq!(&TriSport::default().default_calibration(), model.calibration());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn load_saved_calibration() {
    let dir = scratch_dir("model-save");
    let path = dir.join("calibration.json");
    let calibration = Calibration {
        weights: Weights::from_iter([("form", 0.1), ("odds", 0.9)]),
        temperature: 1.25,
    };
    save_calibration(&path, &calibration, &Metrics::default()).unwrap();
    let model = ScoringModel::load(TriSport::default(), &path);
    assert_eq!(&calibration, model.calibration());

    let recalibrated = model.recalibrated(TriSport::default().default_calibration());
    assert_eq!(1.0, recalibrated.calibration().temperature);
    fs::remove_dir_all(dir).unwrap();
}
