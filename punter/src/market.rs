//! Market-implied probabilities: inverts decimal prices and removes the bookmaker's margin.

use crate::probs::SliceExt;

#[derive(Debug, Clone, PartialEq)]
pub struct Overround {
    pub method: OverroundMethod,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverroundMethod {
    Multiplicative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub probs: Vec<f64>,
    pub prices: Vec<f64>,
    pub overround: Overround,
}
impl Market {
    /// Fits a market to a possibly incomplete set of decimal prices. A missing or invalid price is
    /// replaced with the raw implied probability in `fillers` for that outcome; if an outcome has
    /// neither, the market cannot be fitted. Filled outcomes carry an infinite price.
    pub fn fit(
        method: &OverroundMethod,
        prices: &[Option<f64>],
        fillers: &[Option<f64>],
    ) -> Option<Self> {
        debug_assert_eq!(prices.len(), fillers.len());
        let mut implied = Vec::with_capacity(prices.len());
        let mut fitted_prices = Vec::with_capacity(prices.len());
        for (price, filler) in prices.iter().zip(fillers) {
            match price.filter(|&price| is_valid_price(price)) {
                Some(price) => {
                    implied.push(1.0 / price);
                    fitted_prices.push(price);
                }
                None => {
                    implied.push((*filler)?);
                    fitted_prices.push(f64::INFINITY);
                }
            }
        }
        match method {
            OverroundMethod::Multiplicative => Some(Self::fit_multiplicative(implied, fitted_prices)),
        }
    }

    fn fit_multiplicative(mut probs: Vec<f64>, prices: Vec<f64>) -> Self {
        let overround = probs.normalise(1.0);
        Self {
            probs,
            prices,
            overround: Overround {
                method: OverroundMethod::Multiplicative,
                value: overround,
            },
        }
    }
}

/// A decimal price is usable if it is finite and strictly greater than 1.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 1.0
}
