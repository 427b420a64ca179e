//! Daily price series for a single instrument.

use crate::domain::error::SignalTraderError;

/// Ordered daily prices, index 0 = first trading day.
///
/// Every price is finite and non-negative. The series is immutable once built;
/// each simulator owns its own copy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    pub fn new(prices: Vec<f64>) -> Result<Self, SignalTraderError> {
        if let Some((day, &value)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(SignalTraderError::InvalidPrice { day, value });
        }
        Ok(Self { prices })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn get(&self, day: usize) -> Option<f64> {
        self.prices.get(day).copied()
    }

    /// Price on the day before `day`, if there is one.
    pub fn previous(&self, day: usize) -> Option<f64> {
        day.checked_sub(1).and_then(|d| self.get(d))
    }

    /// Price on the day after `day`, if there is one.
    pub fn next(&self, day: usize) -> Option<f64> {
        self.get(day + 1)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.prices.len().checked_sub(1)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.prices.iter().copied().enumerate()
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = SignalTraderError;

    fn try_from(prices: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(prices)
    }
}
