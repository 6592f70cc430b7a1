//! Two-outcome (player A, player B) scoring of tennis matches.

pub mod domain;
pub mod features;
pub mod model;

/// Where the backtest saves, and the scorer looks for, the tuned calibration.
pub const DEFAULT_CALIBRATION_PATH: &str = "outputs/tennis_calibration.json";

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
