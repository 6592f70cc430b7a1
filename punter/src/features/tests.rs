use assert_float_eq::*;
use ordinalizer::Ordinal;
use strum_macros::EnumCount;

use super::*;
use crate::outcome::AsIndex;
use crate::record::FormResult::{Draw, Loss, Win};

fn encounter(date: Option<&str>, home: &str, away: &str, score: &str) -> Encounter {
    Encounter {
        date: date.map(str::to_string),
        home: Some(home.into()),
        away: Some(away.into()),
        score: Some(score.into()),
    }
}

fn three_outcome() -> H2hScheme {
    H2hScheme {
        decay: 0.9,
        draw_credit: Some(0.5),
        full_sample: 3,
        window: 10,
    }
}

#[test]
fn features_observe_and_assume() {
    let mut features = Features::default();
    features.observe("a", 0.7);
    features.observe("b", f64::NAN);
    features.assume("c", 0.4);
    assert_eq!(Some(0.7), features.get("a"));
    assert!(features.is_observed("a"));
    assert_eq!(Some(NEUTRAL), features.get("b"));
    assert!(!features.is_observed("b"));
    assert_eq!(0.4, features.value("c"));
    assert!(!features.is_observed("c"));
    assert_eq!(NEUTRAL, features.value("missing"));
    assert_eq!(3, features.len());
}

#[derive(Debug, Ordinal, EnumCount)]
enum Group {
    First,
    Second,
    Third,
    Fourth,
}
impl AsIndex for Group {
    fn as_index(&self) -> usize {
        self.ordinal()
    }
}

#[test]
fn coverage_counts_each_group_once() {
    let mut coverage = Coverage::<Group>::default();
    assert_eq!(0.0, coverage.fraction());
    coverage.cover(Group::Second);
    coverage.cover(Group::Second);
    coverage.cover(Group::Fourth);
    assert_eq!(2, coverage.covered());
    assert_eq!(0.5, coverage.fraction());
    coverage.cover(Group::First);
    coverage.cover(Group::Third);
    assert_eq!(1.0, coverage.fraction());
}

#[test]
fn sort_newest_first_mixed_formats() {
    let encounters = vec![
        encounter(Some("12.03.21"), "A", "B", "1:0"),
        encounter(None, "A", "B", "2:0"),
        encounter(Some("2023-05-01"), "A", "B", "3:0"),
        encounter(Some("garbled"), "A", "B", "4:0"),
        encounter(Some("01.01.2022"), "A", "B", "5:0"),
    ];
    let scores: Vec<_> = sort_newest_first(&encounters)
        .into_iter()
        .map(|encounter| encounter.score.as_deref().unwrap())
        .collect();
    assert_eq!(vec!["3:0", "5:0", "1:0", "2:0", "4:0"], scores);
}

#[test]
fn same_contestant_loose() {
    assert!(same_contestant("Manchester United", " manchester united"));
    assert!(same_contestant("Man Utd", "Man Utd FC"));
    assert!(!same_contestant("Arsenal", "Chelsea"));
    assert!(!same_contestant("", "Chelsea"));
}

#[test]
fn h2h_rate_all_wins() {
    let encounters = vec![
        encounter(None, "A", "B", "2:0"),
        encounter(None, "B", "A", "0:1"),
        encounter(None, "A", "B", "3-1"),
        encounter(None, "B", "A", "1:2"),
        encounter(None, "A", "B", "1:0"),
    ];
    let rate = h2h_rate(&encounters, "A", &three_outcome()).unwrap();
    assert_eq!(1.0, rate.rate);
    assert_eq!(5, rate.counted);
    assert_eq!(1.0, rate.confidence);
    assert_eq!(1.0, rate.shrunk(0.4));
}

#[test]
fn h2h_rate_decays_and_credits_draws() {
    let encounters = vec![
        encounter(None, "A", "B", "1:1"),
        encounter(None, "A", "B", "0:2"),
        encounter(None, "B", "A", "0:3"),
    ];
    let rate = h2h_rate(&encounters, "A", &three_outcome()).unwrap();
    let total = 1.0 + 0.9 + 0.81;
    assert_float_absolute_eq!((0.5 + 0.81) / total, rate.rate, 1e-9);
    assert_float_absolute_eq!(1.0, rate.confidence, 1e-9);
}

#[test]
fn h2h_rate_skips_draws_without_credit() {
    let scheme = H2hScheme {
        draw_credit: None,
        ..three_outcome()
    };
    let encounters = vec![
        encounter(None, "A", "B", "1:1"),
        encounter(None, "A", "B", "2:0"),
    ];
    let rate = h2h_rate(&encounters, "A", &scheme).unwrap();
    assert_eq!(1.0, rate.rate);
    assert_eq!(1, rate.counted);
    assert_float_absolute_eq!(1.0 / 2.71, rate.confidence, 1e-9);
    assert_float_absolute_eq!(0.4 + (1.0 / 2.71) * 0.6, rate.shrunk(0.4), 1e-9);
}

#[test]
fn h2h_rate_ignores_illegible_and_foreign_encounters() {
    let encounters = vec![
        encounter(None, "A", "B", "postponed"),
        encounter(None, "C", "D", "2:0"),
        Encounter::default(),
    ];
    assert_eq!(None, h2h_rate(&encounters, "A", &three_outcome()));
    assert_eq!(None, h2h_rate(&[], "A", &three_outcome()));
}

#[test]
fn form_score_three_point() {
    let scheme = FormScheme {
        win: 3.0,
        draw: 1.0,
        loss: 0.0,
        decay: 0.85,
        window: 6,
    };
    assert_eq!(None, form_score(&[], &scheme));
    assert_eq!(Some(1.0), form_score(&[Win; 8], &scheme));
    assert_eq!(Some(0.0), form_score(&[Loss, Loss], &scheme));
    let expected = (1.0 + 3.0 * 0.85) / (3.0 + 3.0 * 0.85);
    assert_f64_near!(expected, form_score(&[Draw, Win], &scheme).unwrap());
}

#[test]
fn streak_counts_leading_wins() {
    assert_eq!(0, streak(&[]));
    assert_eq!(0, streak(&[Loss, Win]));
    assert_eq!(3, streak(&[Win, Win, Win, Draw, Win]));
}

#[test]
fn ranking_gap_bounded() {
    assert_eq!(0.0, ranking_gap(10, 10, 20.0));
    assert_f64_near!(10.0 / 30.0, ranking_gap(5, 15, 20.0));
    assert_f64_near!(-145.0 / 165.0, ranking_gap(150, 5, 20.0));
}

#[test]
fn vote_shares_normalised() {
    let shares = vote_shares(&[Some(50.0), Some(25.0), Some(25.0)]).unwrap();
    assert_eq!(vec![0.5, 0.25, 0.25], shares);
    let shares = vote_shares(&[Some(60.0), None, Some(-5.0)]).unwrap();
    assert_eq!(vec![1.0, 0.0, 0.0], shares);
    assert_eq!(None, vote_shares(&[None, Some(0.0), None]));
}
