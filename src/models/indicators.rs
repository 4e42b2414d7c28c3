//! Windowed indicators over aligned closing prices
//!
//! # Warm-up Convention
//! **IMPORTANT**: A windowed value at index `i` needs `period` trailing
//! values ending at `i`. For `i < period - 1` every function here returns
//! `None` rather than `0.0`, so callers can tell "not enough history" apart
//! from a computed zero.
//!
//! # Price Format
//! Inputs are plain closes in whatever unit the export uses. Both series of a
//! pair may be in different units; correlation and percentage distance are
//! unit-independent, and the ratio series simply carries the unit quotient.

use crate::constants::CORRELATION_DECIMALS;

/// Simple moving average of `closes[i + 1 - period ..= i]`
///
/// Returns `None` when `period` is zero, `i` is out of bounds, or fewer than
/// `period` values end at `i`.
pub fn sma_at(closes: &[f64], i: usize, period: usize) -> Option<f64> {
    if period == 0 || i >= closes.len() || i + 1 < period {
        return None;
    }
    let start_idx = i + 1 - period;
    let sum: f64 = closes[start_idx..=i].iter().sum();
    Some(sum / period as f64)
}

/// Calculate Simple Moving Average for every index
///
/// # Arguments
/// * `closes` - Slice of closing prices
/// * `period` - Period for the moving average (e.g., 100, 200)
///
/// # Returns
/// * Vector of the same length; warm-up entries are `None`
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..closes.len()).map(|i| sma_at(closes, i, period)).collect()
}

/// Moving average over a series with gaps
///
/// A window that contains any missing value has no average.
pub fn calculate_sma_sparse(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut ma_values = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return ma_values;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let sum: Option<f64> = window.iter().copied().sum();
        ma_values[i] = sum.map(|s| s / period as f64);
    }

    ma_values
}

/// Percentage distance from a moving average: ((close - ma) / ma) * 100
///
/// A zero average yields `0.0`.
///
/// # Example
/// ```
/// // close = 110, ma = 100
/// // distance = ((110 - 100) / 100) * 100 = 10.0
/// ```
pub fn calculate_ma_score(close: f64, ma: f64) -> f64 {
    if ma == 0.0 {
        0.0
    } else {
        ((close - ma) / ma) * 100.0
    }
}

/// Distance for optional inputs; `None` if either side is missing
pub fn ma_distance(value: Option<f64>, ma: Option<f64>) -> Option<f64> {
    match (value, ma) {
        (Some(v), Some(m)) => Some(calculate_ma_score(v, m)),
        _ => None,
    }
}

/// Pearson product-moment correlation of two equal-length slices
///
/// Uses the raw-sums form
/// `(n·Σxy − Σx·Σy) / sqrt((n·Σx² − (Σx)²) · (n·Σy² − (Σy)²))`.
/// A zero denominator (either slice constant) yields `0.0`, not NaN.
///
/// # Returns
/// * `None` if the slices differ in length or are empty
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }

    let n = x.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_x2 += xi * xi;
        sum_y2 += yi * yi;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    // Rounding can push a zero variance slightly negative, giving NaN here
    if denominator == 0.0 || denominator.is_nan() {
        Some(0.0)
    } else {
        Some(numerator / denominator)
    }
}

/// Unrounded rolling correlation of the `window` values ending at `i`
pub fn rolling_correlation_raw(x: &[f64], y: &[f64], i: usize, window: usize) -> Option<f64> {
    if window == 0 || i + 1 < window || i >= x.len() || i >= y.len() {
        return None;
    }
    let start = i + 1 - window;
    pearson(&x[start..=i], &y[start..=i])
}

/// Rolling correlation at index `i`, rounded to 4 decimals
pub fn rolling_correlation_at(x: &[f64], y: &[f64], i: usize, window: usize) -> Option<f64> {
    rolling_correlation_raw(x, y, i, window).map(|r| round_to(r, CORRELATION_DECIMALS))
}

/// Rolling correlation for every index, rounded to 4 decimals
pub fn calculate_rolling_correlation(x: &[f64], y: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = x.len().min(y.len());
    (0..n).map(|i| rolling_correlation_at(x, y, i, window)).collect()
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
