//! Descriptive statistics over a price series.

use super::price_series::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub range: f64,
    pub iqr: f64,
    pub up_days: usize,
    pub down_days: usize,
    pub longest_up: usize,
    pub longest_down: usize,
}

impl SeriesStats {
    /// `None` for series shorter than two prices.
    pub fn compute(series: &PriceSeries) -> Option<Self> {
        let prices = series.as_slice();
        let n = prices.len();
        if n < 2 {
            return None;
        }

        let mean = prices.iter().sum::<f64>() / n as f64;
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        let mut sorted = prices.to_vec();
        sorted.sort_by(f64::total_cmp);
        let [q1, q2, q3] = quartiles(&sorted);

        Some(SeriesStats {
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
            q1,
            q2,
            q3,
            range: max - min,
            iqr: q3 - q1,
            up_days: count_moves(prices, |cur, prev| cur > prev),
            down_days: count_moves(prices, |cur, prev| cur < prev),
            longest_up: longest_streak(prices, |cur, prev| cur > prev),
            longest_down: longest_streak(prices, |cur, prev| cur < prev),
        })
    }
}

/// Quartile cut points using the exclusive method (`m = n + 1`).
fn quartiles(sorted: &[f64]) -> [f64; 3] {
    let n = sorted.len();
    let m = n + 1;
    let mut out = [0.0; 3];
    for (slot, i) in out.iter_mut().zip(1..4usize) {
        let j = (i * m / 4).clamp(1, n - 1);
        let delta = (i * m) as f64 - (j * 4) as f64;
        *slot = (sorted[j - 1] * (4.0 - delta) + sorted[j] * delta) / 4.0;
    }
    out
}

/// Days where `cmp(price, previous)` holds. The first day compares against 0.
fn count_moves(prices: &[f64], cmp: impl Fn(f64, f64) -> bool) -> usize {
    let mut prev = 0.0;
    let mut count = 0;
    for &price in prices {
        if cmp(price, prev) {
            count += 1;
        }
        prev = price;
    }
    count
}

fn longest_streak(prices: &[f64], cmp: impl Fn(f64, f64) -> bool) -> usize {
    let mut prev = 0.0;
    let mut current = 0;
    let mut longest = 0;
    for &price in prices {
        if cmp(price, prev) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
        prev = price;
    }
    longest
}
