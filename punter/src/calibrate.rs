//! Temperature-scaled softmax over per-outcome logits.

/// Probabilities are clamped to `[EPSILON, 1 - EPSILON]` before taking logits.
pub const EPSILON: f64 = 1e-6;

/// The binary logit `ln(p / (1 - p))` of a clamped probability.
pub fn logit(prob: f64) -> f64 {
    let prob = prob.clamp(EPSILON, 1.0 - EPSILON);
    f64::ln(prob / (1.0 - prob))
}

/// Converts each probability to a logit, divides by `temperature` and takes the softmax.
/// Temperatures above 1 soften the distribution; below 1 sharpen it. The ordering of the
/// probabilities is preserved.
pub fn temperature_scale(probs: &[f64], temperature: f64) -> Vec<f64> {
    debug_assert!(
        temperature.is_finite() && temperature > 0.0,
        "invalid temperature {temperature}"
    );
    let scaled: Vec<_> = probs
        .iter()
        .map(|&prob| logit(prob) / temperature)
        .collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<_> = scaled.iter().map(|&scaled| f64::exp(scaled - max)).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|exp| exp / sum).collect()
}
