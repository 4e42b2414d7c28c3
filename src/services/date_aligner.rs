//! Inner join of two close series on trading date

use crate::error::{AppError, Result};
use crate::models::{MergedPoint, RawPoint};
use crate::services::calendar::jalali_to_gregorian;
use std::collections::HashMap;
use tracing::debug;

/// Pair up closes of both instruments on the dates they both traded
///
/// Output follows the order of `series1`; it is not re-sorted, so callers
/// pass ascending input (as the CSV parser produces). When `series2` repeats
/// a date, its last close for that date is used.
pub fn align(series1: &[RawPoint], series2: &[RawPoint]) -> Vec<MergedPoint> {
    let lookup: HashMap<&str, f64> = series2
        .iter()
        .map(|p| (p.date.as_str(), p.close))
        .collect();

    let merged: Vec<MergedPoint> = series1
        .iter()
        .filter_map(|p| {
            lookup.get(p.date.as_str()).map(|&price2| MergedPoint {
                date: p.date.clone(),
                price1: p.close,
                price2,
            })
        })
        .collect();

    debug!(
        "Aligned {} of {} / {} points",
        merged.len(),
        series1.len(),
        series2.len()
    );
    merged
}

/// Keep points between two inclusive Jalali bounds (`YYYY/MM/DD`)
///
/// Either bound may be omitted. Bounds are converted to Gregorian keys once
/// and compared against each point's `YYYYMMDD` date.
pub fn filter_by_jalali_range(
    points: &[RawPoint],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<RawPoint>> {
    let start_key = start.map(jalali_to_gregorian).transpose()?;
    let end_key = end.map(jalali_to_gregorian).transpose()?;

    if let (Some(s), Some(e)) = (&start_key, &end_key) {
        if s > e {
            return Err(AppError::InvalidInput(format!(
                "Start date {} is after end date {}",
                start.unwrap_or_default(),
                end.unwrap_or_default()
            )));
        }
    }

    Ok(points
        .iter()
        .filter(|p| start_key.as_deref().map_or(true, |s| p.date.as_str() >= s))
        .filter(|p| end_key.as_deref().map_or(true, |e| p.date.as_str() <= e))
        .cloned()
        .collect())
}
