//! # Histogram Binning
//!
//! Freedman–Diaconis bin sizing for metric value columns.
//!
//! ## Algorithm
//! 1. Drop NaN values
//! 2. IQR from the linearly interpolated 25th and 75th percentiles
//! 3. Bin width `2 · IQR / n^(1/3)`
//! 4. Bin count `(max - min) / width + 1`
//!
//! Degenerate inputs (empty data, zero IQR, overflow) fall back to
//! [`DEFAULT_BIN_WIDTH`] and [`DEFAULT_BIN_COUNT`] with a warning.

use log::warn;

/// Bin width used when the Freedman–Diaconis width is not usable.
pub const DEFAULT_BIN_WIDTH: f64 = 1.0;

/// Bin count used when the Freedman–Diaconis count is not usable.
pub const DEFAULT_BIN_COUNT: usize = 2;

fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut values: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Percentile `q` in `[0, 1]` of sorted values, linearly interpolated.
fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Interquartile range, ignoring NaN. `None` for empty input.
pub fn iqr(data: &[f64]) -> Option<f64> {
    let sorted = sorted_finite(data);
    let q1 = percentile_sorted(&sorted, 0.25)?;
    let q3 = percentile_sorted(&sorted, 0.75)?;
    Some(q3 - q1)
}

/// Raw `2 · IQR / n^(1/3)` over sorted values, NaN for empty input.
fn raw_width(sorted: &[f64]) -> f64 {
    match (
        percentile_sorted(sorted, 0.25),
        percentile_sorted(sorted, 0.75),
    ) {
        (Some(q1), Some(q3)) => 2.0 * (q3 - q1) / (sorted.len() as f64).cbrt(),
        _ => f64::NAN,
    }
}

/// Freedman–Diaconis bin width.
pub fn freedman_diaconis_width(data: &[f64]) -> f64 {
    let sorted = sorted_finite(data);
    let n = sorted.len();
    let width = raw_width(&sorted);

    if width.is_finite() && width > 0.0 {
        width
    } else {
        warn!(
            "[Stats] Freedman-Diaconis width {} is not usable for {} values, using {}",
            width, n, DEFAULT_BIN_WIDTH
        );
        DEFAULT_BIN_WIDTH
    }
}

/// Freedman–Diaconis bin count.
///
/// A zero or non-finite width gives [`DEFAULT_BIN_COUNT`], not a count
/// derived from [`DEFAULT_BIN_WIDTH`].
pub fn freedman_diaconis_bins(data: &[f64]) -> usize {
    let sorted = sorted_finite(data);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        warn!("[Stats] No values to bin, using {} bins", DEFAULT_BIN_COUNT);
        return DEFAULT_BIN_COUNT;
    };

    let width = raw_width(&sorted);
    if !(width.is_finite() && width > 0.0) {
        warn!(
            "[Stats] Freedman-Diaconis width {} is not usable for {} values, using {} bins",
            width,
            sorted.len(),
            DEFAULT_BIN_COUNT
        );
        return DEFAULT_BIN_COUNT;
    }

    let bins = ((max - min) / width).floor() + 1.0;

    if bins.is_finite() && bins >= 1.0 && bins < usize::MAX as f64 {
        bins as usize
    } else {
        warn!(
            "[Stats] Bin count {} is not usable (range {}..{}, width {}), using {}",
            bins, min, max, width, DEFAULT_BIN_COUNT
        );
        DEFAULT_BIN_COUNT
    }
}
