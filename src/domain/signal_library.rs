//! Built-in buy/sell predicates.
//!
//! Every predicate is a pure function of `(series, day, price, rate)`. Days are
//! 0-based indexes into the series. The `rate` argument is only read by the
//! rate-threshold pair; the others accept it so all predicates share one
//! signature.
//!
//! # Boundary semantics
//!
//! - Valley/peak: the last index has no successor and always returns `true`;
//!   day 0 has no predecessor and returns `false` unless it is also the last
//!   index.
//! - Percentage change: day 0 returns `true` for `buy_at_decrease` and `false`
//!   for `sell_at_increase`; a zero denominator returns `false`.
//! - Three-day trends: return `false` before day 2.

use crate::domain::price_series::PriceSeries;
use crate::domain::rounding::round_to;

/// Rounded percent change `buy_at_decrease` looks for.
pub const DECREASE_TRIGGER_PCT: f64 = -20.0;

/// Rounded percent rise `sell_at_increase` looks for.
pub const INCREASE_TRIGGER_PCT: f64 = 20.0;

/// Last decimal digit of the day number on which `buy_at_date` fires.
pub const BUY_DATE_DIGIT: usize = 1;

/// Last decimal digit of the day number on which `sell_at_date` fires.
pub const SELL_DATE_DIGIT: usize = 5;

pub fn buy_at_rate(_series: &PriceSeries, _day: usize, price: f64, rate: f64) -> bool {
    price < rate
}

pub fn sell_at_rate(_series: &PriceSeries, _day: usize, price: f64, rate: f64) -> bool {
    price > rate
}

/// Price strictly below both neighbours.
pub fn buy_at_valley(series: &PriceSeries, day: usize, price: f64, _rate: f64) -> bool {
    let Some(next) = series.next(day) else {
        return true;
    };
    match series.previous(day) {
        Some(prev) => price < prev && price < next,
        None => false,
    }
}

/// Price strictly above both neighbours.
pub fn sell_at_peak(series: &PriceSeries, day: usize, price: f64, _rate: f64) -> bool {
    let Some(next) = series.next(day) else {
        return true;
    };
    match series.previous(day) {
        Some(prev) => price > prev && price > next,
        None => false,
    }
}

/// `round(100 * (prev - price) / price) == -20`.
///
/// The change is measured against the current price, so the rule fires when
/// the previous close sits 20% of today's price below it.
pub fn buy_at_decrease(series: &PriceSeries, day: usize, price: f64, _rate: f64) -> bool {
    let Some(prev) = series.previous(day) else {
        return day == 0;
    };
    if price == 0.0 {
        return false;
    }
    round_to(100.0 * (prev - price) / price, 0) == DECREASE_TRIGGER_PCT
}

/// `round(100 * (price - prev) / prev) == 20`, a 20% rise over the previous day.
pub fn sell_at_increase(series: &PriceSeries, day: usize, price: f64, _rate: f64) -> bool {
    let Some(prev) = series.previous(day) else {
        return false;
    };
    if prev == 0.0 {
        return false;
    }
    round_to(100.0 * (price - prev) / prev, 0) == INCREASE_TRIGGER_PCT
}

/// Two preceding prices and today's price strictly decrease.
pub fn buy_at_three_decrease(series: &PriceSeries, day: usize, price: f64, _rate: f64) -> bool {
    match trailing_pair(series, day) {
        Some((first, second)) => first > second && second > price,
        None => false,
    }
}

/// Two preceding prices and today's price strictly increase.
pub fn sell_at_three_increase(series: &PriceSeries, day: usize, price: f64, _rate: f64) -> bool {
    match trailing_pair(series, day) {
        Some((first, second)) => first < second && second < price,
        None => false,
    }
}

pub fn buy_at_date(_series: &PriceSeries, day: usize, _price: f64, _rate: f64) -> bool {
    day % 10 == BUY_DATE_DIGIT
}

pub fn sell_at_date(_series: &PriceSeries, day: usize, _price: f64, _rate: f64) -> bool {
    day % 10 == SELL_DATE_DIGIT
}

fn trailing_pair(series: &PriceSeries, day: usize) -> Option<(f64, f64)> {
    let first = series.get(day.checked_sub(2)?)?;
    let second = series.get(day - 1)?;
    Some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: &[f64]) -> PriceSeries {
        PriceSeries::new(prices.to_vec()).unwrap()
    }

    #[test]
    fn rate_thresholds_are_strict() {
        let s = series(&[50.0]);
        assert!(buy_at_rate(&s, 0, 49.99, 50.0));
        assert!(!buy_at_rate(&s, 0, 50.0, 50.0));
        assert!(sell_at_rate(&s, 0, 60.01, 60.0));
        assert!(!sell_at_rate(&s, 0, 60.0, 60.0));
    }

    #[test]
    fn valley_requires_both_neighbours_higher() {
        let s = series(&[10.0, 8.0, 9.0, 9.0, 12.0]);
        assert!(buy_at_valley(&s, 1, 8.0, 0.0));
        assert!(!buy_at_valley(&s, 2, 9.0, 0.0));
        // equal neighbour is not a strict valley
        assert!(!buy_at_valley(&s, 3, 9.0, 0.0));
    }

    #[test]
    fn peak_requires_both_neighbours_lower() {
        let s = series(&[10.0, 12.0, 11.0, 11.0, 9.0]);
        assert!(sell_at_peak(&s, 1, 12.0, 0.0));
        assert!(!sell_at_peak(&s, 2, 11.0, 0.0));
        assert!(!sell_at_peak(&s, 3, 11.0, 0.0));
    }

    #[test]
    fn valley_and_peak_true_at_last_index() {
        let s = series(&[1.0, 2.0, 3.0]);
        assert!(buy_at_valley(&s, 2, 3.0, 0.0));
        assert!(sell_at_peak(&s, 2, 3.0, 0.0));

        let single = series(&[42.0]);
        assert!(buy_at_valley(&single, 0, 42.0, 0.0));
        assert!(sell_at_peak(&single, 0, 42.0, 0.0));
    }

    #[test]
    fn valley_and_peak_false_on_first_day() {
        let s = series(&[5.0, 10.0, 1.0]);
        assert!(!buy_at_valley(&s, 0, 5.0, 0.0));
        let s = series(&[15.0, 10.0, 12.0]);
        assert!(!sell_at_peak(&s, 0, 15.0, 0.0));
    }

    #[test]
    fn decrease_first_day_is_true_and_increase_first_day_is_false() {
        let s = series(&[100.0, 120.0]);
        assert!(buy_at_decrease(&s, 0, 100.0, 0.0));
        assert!(!sell_at_increase(&s, 0, 100.0, 0.0));
    }

    #[test]
    fn decrease_matches_rounded_formula() {
        // (80 - 100) / 100 = -20%
        let s = series(&[80.0, 100.0]);
        assert!(buy_at_decrease(&s, 1, 100.0, 0.0));

        // (100 - 80) / 80 = +25%
        let s = series(&[100.0, 80.0]);
        assert!(!buy_at_decrease(&s, 1, 80.0, 0.0));

        // (80.4 - 100) / 100 = -19.6% rounds to -20
        let s = series(&[80.4, 100.0]);
        assert!(buy_at_decrease(&s, 1, 100.0, 0.0));

        // -21% does not
        let s = series(&[79.0, 100.0]);
        assert!(!buy_at_decrease(&s, 1, 100.0, 0.0));
    }

    #[test]
    fn increase_detects_twenty_percent_rise() {
        let s = series(&[100.0, 120.0]);
        assert!(sell_at_increase(&s, 1, 120.0, 0.0));

        let s = series(&[100.0, 119.6]);
        assert!(sell_at_increase(&s, 1, 119.6, 0.0));

        let s = series(&[100.0, 80.0]);
        assert!(!sell_at_increase(&s, 1, 80.0, 0.0));

        let s = series(&[100.0, 125.0]);
        assert!(!sell_at_increase(&s, 1, 125.0, 0.0));
    }

    #[test]
    fn percentage_change_fails_closed_on_zero() {
        let s = series(&[10.0, 0.0]);
        assert!(!buy_at_decrease(&s, 1, 0.0, 0.0));

        let s = series(&[0.0, 10.0]);
        assert!(!sell_at_increase(&s, 1, 10.0, 0.0));
    }

    #[test]
    fn three_decrease_needs_strict_run() {
        let s = series(&[100.0, 90.0, 80.0, 80.0, 70.0]);
        assert!(buy_at_three_decrease(&s, 2, 80.0, 0.0));
        assert!(!buy_at_three_decrease(&s, 3, 80.0, 0.0));
        assert!(!buy_at_three_decrease(&s, 4, 70.0, 0.0));
    }

    #[test]
    fn three_increase_needs_strict_run() {
        let s = series(&[100.0, 90.0, 80.0, 95.0, 110.0]);
        assert!(sell_at_three_increase(&s, 4, 110.0, 0.0));
        assert!(!sell_at_three_increase(&s, 3, 95.0, 0.0));
    }

    #[test]
    fn three_day_trends_false_without_history() {
        let s = series(&[3.0, 2.0, 1.0]);
        assert!(!buy_at_three_decrease(&s, 0, 3.0, 0.0));
        assert!(!buy_at_three_decrease(&s, 1, 2.0, 0.0));
        assert!(!sell_at_three_increase(&s, 1, 2.0, 0.0));
    }

    #[test]
    fn date_cadence_uses_last_digit() {
        let s = series(&[]);
        for day in [1, 11, 21, 101] {
            assert!(buy_at_date(&s, day, 0.0, 0.0));
        }
        for day in [0, 10, 12, 15] {
            assert!(!buy_at_date(&s, day, 0.0, 0.0));
        }
        for day in [5, 15, 365] {
            assert!(sell_at_date(&s, day, 0.0, 0.0));
        }
        assert!(!sell_at_date(&s, 50, 0.0, 0.0));
    }

    #[test]
    fn rate_is_ignored_by_non_rate_predicates() {
        let s = series(&[100.0, 90.0, 80.0]);
        assert_eq!(
            buy_at_three_decrease(&s, 2, 80.0, 0.0),
            buy_at_three_decrease(&s, 2, 80.0, 1e9)
        );
        assert_eq!(
            buy_at_valley(&s, 1, 90.0, -5.0),
            buy_at_valley(&s, 1, 90.0, 5.0)
        );
    }
}
