//! A deterministic ensemble model of match outcome probabilities. Combines head-to-head records,
//! recent form, market odds and third-party predictions into calibrated outcome probabilities,
//! and derives value-betting metrics from them. Generic over the outcomes of a contest; see the
//! `punter-football` and `punter-tennis` crates for concrete sports.

pub mod backtest;
pub mod batch;
pub mod calibrate;
pub mod calibration;
pub mod ensemble;
pub mod features;
pub mod file;
pub mod lenient;
pub mod market;
pub mod model;
pub mod opt;
pub mod outcome;
pub mod print;
pub mod probs;
pub mod record;
pub mod sport;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
