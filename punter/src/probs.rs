//! Utilities for working with probabilities.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
    fn clip_below(&mut self, floors: &[f64]);
    fn argmax(&self) -> Option<usize>;
    fn is_finite(&self) -> bool;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        if sum > 0.0 && sum.is_finite() {
            self.scale(target / sum);
        } else {
            let share = target / self.len() as f64;
            for element in &mut *self {
                *element = share;
            }
        }
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }

    fn clip_below(&mut self, floors: &[f64]) {
        debug_assert_eq!(
            self.len(),
            floors.len(),
            "number of floors {} does not match number of elements {}",
            floors.len(),
            self.len()
        );
        for (element, &floor) in self.iter_mut().zip(floors) {
            *element = f64::max(*element, floor);
        }
    }

    /// Index of the largest element. The first index wins a tie; `NaN`s are never selected.
    fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &value) in self.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((index, value)),
            }
        }
        best.map(|(index, _)| index)
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|value| value.is_finite())
    }
}

/// Rounds `value` to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}
