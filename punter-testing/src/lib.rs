//! Assertions shared by the test suites of the punter crates.

use assert_float_eq::*;

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

pub fn assert_slice_f64_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        assert_float_absolute_eq!(expected, actual[index], epsilon);
    }
}

/// Asserts that `probs` form a distribution: every element lies in [0, 1] and the
/// elements sum to 1 within `epsilon`.
pub fn assert_distribution(probs: &[f64], epsilon: f64) {
    assert!(!probs.is_empty(), "empty distribution");
    for (index, &prob) in probs.iter().enumerate() {
        assert!(
            (0.0..=1.0).contains(&prob),
            "probability {prob} at index {index} outside [0, 1]"
        );
    }
    let sum: f64 = probs.iter().sum();
    assert_float_absolute_eq!(1.0, sum, epsilon);
}
