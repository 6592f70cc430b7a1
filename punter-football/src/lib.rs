//! Three-outcome (home, draw, away) scoring of football matches.

pub mod domain;
pub mod features;
pub mod model;

/// Where the backtest saves, and the scorer looks for, the tuned calibration.
pub const DEFAULT_CALIBRATION_PATH: &str = "outputs/scoring_calibration.json";

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
