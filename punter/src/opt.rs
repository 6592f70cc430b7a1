//! Derivative-free minimisation of a bounded univariate objective, used to tune calibration
//! parameters one at a time.

use std::ops::RangeInclusive;

use anyhow::bail;

#[derive(Clone, Debug)]
pub struct DescentConfig {
    /// Starting point; clamped to `bounds`.
    pub init_value: f64,
    pub init_step: f64,
    pub min_step: f64,
    pub max_steps: u64,
    pub acceptable_residual: f64,
    /// Closed interval every visited value is clamped to.
    pub bounds: RangeInclusive<f64>,
}
impl DescentConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.init_value.is_finite() {
            bail!("initial value must be finite");
        }
        if self.init_step == 0.0 || !self.init_step.is_finite() {
            bail!("initial step must be non-zero and finite");
        }
        if self.min_step.is_nan() || self.min_step <= 0.0 {
            bail!("min step must be positive");
        }
        if self.acceptable_residual.is_nan() || self.acceptable_residual < 0.0 {
            bail!("acceptable residual must be non-negative");
        }
        let (lower, upper) = (*self.bounds.start(), *self.bounds.end());
        if lower.is_nan() || upper.is_nan() || lower > upper {
            bail!("invalid bounds {lower}..={upper}");
        }
        Ok(())
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(*self.bounds.start(), *self.bounds.end())
    }
}

#[derive(Debug, PartialEq)]
pub struct DescentOutcome {
    pub steps: u64,
    pub optimal_value: f64,
    pub optimal_residual: f64,
}

/// Walks in the direction of the initial step while the residual keeps falling. On an overshoot,
/// or on running into a bound, reverses and halves the step; stops once the step is finer than
/// `min_step`, the step budget runs out, or the residual becomes acceptable.
pub fn univariate_descent(
    config: &DescentConfig,
    mut objective: impl FnMut(f64) -> f64,
) -> Result<DescentOutcome, anyhow::Error> {
    config.validate()?;

    let mut value = config.clamp(config.init_value);
    let mut residual = objective(value);
    let mut best = DescentOutcome {
        steps: 0,
        optimal_value: value,
        optimal_residual: residual,
    };
    let mut step = config.init_step;
    while best.optimal_residual > config.acceptable_residual && best.steps < config.max_steps {
        best.steps += 1;
        let candidate = config.clamp(value + step);
        let candidate_residual = if candidate == value {
            f64::INFINITY
        } else {
            objective(candidate)
        };

        if candidate_residual.is_nan() || candidate_residual > residual {
            step *= -0.5;
            if step.abs() < config.min_step {
                break;
            }
            continue;
        }

        if candidate_residual < best.optimal_residual {
            best.optimal_value = candidate;
            best.optimal_residual = candidate_residual;
        }
        value = candidate;
        residual = candidate_residual;
    }
    Ok(best)
}
