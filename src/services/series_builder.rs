//! Series Builder
//!
//! Turns two close series into the record stream charted for a pair:
//! - Prices of both instruments on each shared trading date
//! - Rolling Pearson correlation for every requested window
//! - MA100 / MA200 of each instrument
//! - Ratio mode: price1 / price2 with its own MAs and percentage distance
//!
//! The ratio analysis reuses the same moving average and distance functions
//! as the price columns; it is the base engine run over a derived series.

use crate::constants::{MA_LONG_PERIOD, MA_SHORT_PERIOD};
use crate::error::{AppError, Result};
use crate::models::indicators::{calculate_rolling_correlation, calculate_sma, calculate_sma_sparse, ma_distance};
use crate::models::{AnalysisRecord, AnalysisRequest, AnalysisSeries, Correlations, MergedPoint, ParsedSeries, RatioMetrics};
use crate::services::calendar::{gregorian_timestamp_millis, gregorian_to_jalali};
use crate::services::date_aligner::{align, filter_by_jalali_range};
use crate::utils::ConversionCache;
use std::time::Instant;
use tracing::{debug, info};

/// Per-index ratio columns, computed for the whole series at once
struct RatioColumns {
    ratio: Vec<Option<f64>>,
    ma_short: Vec<Option<f64>>,
    ma_long: Vec<Option<f64>>,
}

impl RatioColumns {
    fn compute(merged: &[MergedPoint]) -> Self {
        let ratio: Vec<Option<f64>> = merged
            .iter()
            .map(|p| if p.price2 == 0.0 { None } else { Some(p.price1 / p.price2) })
            .collect();
        let ma_short = calculate_sma_sparse(&ratio, MA_SHORT_PERIOD);
        let ma_long = calculate_sma_sparse(&ratio, MA_LONG_PERIOD);
        Self { ratio, ma_short, ma_long }
    }

    fn metrics_at(&self, i: usize) -> RatioMetrics {
        RatioMetrics {
            ratio: self.ratio[i],
            ratio_ma100: self.ma_short[i],
            ratio_ma200: self.ma_long[i],
            dist_ma100_ratio: ma_distance(self.ratio[i], self.ma_short[i]),
            dist_ma200_ratio: ma_distance(self.ratio[i], self.ma_long[i]),
        }
    }
}

/// Moving average column, or all `None` when MAs were not requested
fn ma_column(closes: &[f64], period: usize, enabled: bool) -> Vec<Option<f64>> {
    if enabled {
        calculate_sma(closes, period)
    } else {
        vec![None; closes.len()]
    }
}

/// Check the request and the amount of aligned history before any work
fn check_request(merged: &[MergedPoint], request: &AnalysisRequest) -> Result<()> {
    request.validate()?;

    let required = request.min_required_points();
    if merged.len() < required {
        return Err(AppError::InsufficientData {
            available: merged.len(),
            required,
        });
    }
    Ok(())
}

/// Build one record per aligned date
///
/// Fails without output if the request is invalid, if fewer points exist
/// than the smallest window, or if any date cannot be converted.
pub fn build_records(merged: &[MergedPoint], request: &AnalysisRequest) -> Result<Vec<AnalysisRecord>> {
    build_records_inner(merged, request, &mut |key: &str| gregorian_to_jalali(key))
}

/// Same as [`build_records`], memoising date conversions in `cache`
pub fn build_records_with_cache(
    merged: &[MergedPoint],
    request: &AnalysisRequest,
    cache: &mut ConversionCache,
) -> Result<Vec<AnalysisRecord>> {
    build_records_inner(merged, request, &mut |key: &str| {
        cache.get_or_compute(key, gregorian_to_jalali)
    })
}

fn build_records_inner(
    merged: &[MergedPoint],
    request: &AnalysisRequest,
    to_display_date: &mut dyn FnMut(&str) -> Result<String>,
) -> Result<Vec<AnalysisRecord>> {
    check_request(merged, request)?;

    let start = Instant::now();
    let windows = request.normalized_windows();

    let closes1: Vec<f64> = merged.iter().map(|p| p.price1).collect();
    let closes2: Vec<f64> = merged.iter().map(|p| p.price2).collect();

    let ma100_1 = ma_column(&closes1, MA_SHORT_PERIOD, request.include_ma);
    let ma100_2 = ma_column(&closes2, MA_SHORT_PERIOD, request.include_ma);
    let ma200_1 = ma_column(&closes1, MA_LONG_PERIOD, request.include_ma);
    let ma200_2 = ma_column(&closes2, MA_LONG_PERIOD, request.include_ma);

    let correlation_columns: Vec<(usize, Vec<Option<f64>>)> = windows
        .iter()
        .map(|&w| (w, calculate_rolling_correlation(&closes1, &closes2, w)))
        .collect();

    let ratio_columns = request.ratio.then(|| RatioColumns::compute(merged));

    let mut records = Vec::with_capacity(merged.len());
    for (i, point) in merged.iter().enumerate() {
        let correlations: Correlations = correlation_columns
            .iter()
            .map(|(w, column)| (*w, column[i]))
            .collect();

        records.push(AnalysisRecord {
            date: to_display_date(&point.date)?,
            gregorian: point.date.clone(),
            timestamp: gregorian_timestamp_millis(&point.date)?,
            price1: point.price1,
            price2: point.price2,
            ma100_1: ma100_1[i],
            ma100_2: ma100_2[i],
            ma200_1: ma200_1[i],
            ma200_2: ma200_2[i],
            correlations,
            ratio: ratio_columns.as_ref().map(|r| r.metrics_at(i)),
        });
    }

    debug!(
        "Built {} record(s) for windows {:?} (ratio: {}) in {:?}",
        records.len(),
        windows,
        request.ratio,
        start.elapsed()
    );
    Ok(records)
}

/// Full pipeline for one pair: date-range filter, align, build
pub fn analyze_pair(
    series1: &ParsedSeries,
    series2: &ParsedSeries,
    request: &AnalysisRequest,
) -> Result<AnalysisSeries> {
    analyze_pair_inner(series1, series2, request, None)
}

/// Full pipeline for one pair, sharing date conversions through `cache`
pub fn analyze_pair_with_cache(
    series1: &ParsedSeries,
    series2: &ParsedSeries,
    request: &AnalysisRequest,
    cache: &mut ConversionCache,
) -> Result<AnalysisSeries> {
    analyze_pair_inner(series1, series2, request, Some(cache))
}

fn analyze_pair_inner(
    series1: &ParsedSeries,
    series2: &ParsedSeries,
    request: &AnalysisRequest,
    cache: Option<&mut ConversionCache>,
) -> Result<AnalysisSeries> {
    let start = request.start.as_deref();
    let end = request.end.as_deref();

    let merged = if start.is_some() || end.is_some() {
        let points1 = filter_by_jalali_range(&series1.points, start, end)?;
        let points2 = filter_by_jalali_range(&series2.points, start, end)?;
        align(&points1, &points2)
    } else {
        align(&series1.points, &series2.points)
    };

    let records = match cache {
        Some(cache) => build_records_with_cache(&merged, request, cache)?,
        None => build_records(&merged, request)?,
    };

    info!(
        "{} vs {}: {} aligned point(s), {} record(s)",
        series1.name,
        series2.name,
        merged.len(),
        records.len()
    );

    Ok(AnalysisSeries {
        name1: series1.name.clone(),
        name2: series2.name.clone(),
        windows: request.normalized_windows(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPoint;
    use crate::services::calendar::format_gregorian_key;
    use chrono::{Duration, NaiveDate};

    /// Consecutive calendar days starting 2024-03-20 (Jalali 1403/01/01)
    fn merged_from(prices1: &[f64], prices2: &[f64]) -> Vec<MergedPoint> {
        let base = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        prices1
            .iter()
            .zip(prices2)
            .enumerate()
            .map(|(i, (&p1, &p2))| MergedPoint {
                date: format_gregorian_key(base + Duration::days(i as i64)),
                price1: p1,
                price2: p2,
            })
            .collect()
    }

    fn series(name: &str, merged: &[MergedPoint], first: bool) -> ParsedSeries {
        ParsedSeries {
            name: name.to_string(),
            points: merged
                .iter()
                .map(|m| RawPoint::new(m.date.clone(), if first { m.price1 } else { m.price2 }))
                .collect(),
            skipped: 0,
        }
    }

    #[test]
    fn test_linear_pair_correlation() {
        let merged = merged_from(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]);
        let records = build_records(&merged, &AnalysisRequest::new(vec![5])).unwrap();

        assert_eq!(records.len(), 5);
        for record in &records[..4] {
            assert_eq!(record.correlations.get(&5), Some(&None));
        }
        assert_eq!(records[4].correlation(5), Some(1.0));
    }

    #[test]
    fn test_record_dates_and_timestamps() {
        let merged = merged_from(&[1.0, 2.0], &[1.0, 3.0]);
        let records = build_records(&merged, &AnalysisRequest::new(vec![2])).unwrap();

        assert_eq!(records[0].date, "1403/01/01");
        assert_eq!(records[0].gregorian, "20240320");
        assert_eq!(records[0].timestamp, 1_710_892_800_000);
        assert_eq!(records[1].date, "1403/01/02");
        assert_eq!(records[1].timestamp - records[0].timestamp, 86_400_000);
    }

    #[test]
    fn test_insufficient_data() {
        let merged = merged_from(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        let err = build_records(&merged, &AnalysisRequest::new(vec![30, 7])).unwrap_err();
        assert_eq!(err, AppError::InsufficientData { available: 3, required: 7 });
    }

    #[test]
    fn test_empty_alignment_is_insufficient() {
        let err = build_records(&[], &AnalysisRequest::new(vec![]).with_ratio(true)).unwrap_err();
        assert_eq!(err, AppError::InsufficientData { available: 0, required: 1 });
    }

    #[test]
    fn test_invalid_request_rejected_first() {
        let merged = merged_from(&[1.0, 2.0], &[1.0, 2.0]);
        let err = build_records(&merged, &AnalysisRequest::new(vec![0])).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_date_fails_whole_build() {
        let mut merged = merged_from(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]);
        merged[2].date = "2024XX22".to_string();
        let err = build_records(&merged, &AnalysisRequest::new(vec![2])).unwrap_err();
        assert!(matches!(err, AppError::InvalidDate(_)));
    }

    #[test]
    fn test_moving_averages_warm_up() {
        let prices1: Vec<f64> = (1..=250).map(|v| v as f64).collect();
        let prices2: Vec<f64> = (1..=250).map(|v| (v * 2) as f64).collect();
        let merged = merged_from(&prices1, &prices2);
        let records = build_records(&merged, &AnalysisRequest::new(vec![7])).unwrap();

        assert_eq!(records[98].ma100_1, None);
        // mean of 1..=100
        assert_eq!(records[99].ma100_1, Some(50.5));
        assert_eq!(records[99].ma100_2, Some(101.0));
        assert_eq!(records[198].ma200_1, None);
        // mean of 1..=200
        assert_eq!(records[199].ma200_1, Some(100.5));
        assert_eq!(records[249].ma200_2, Some(301.0));
    }

    #[test]
    fn test_moving_averages_disabled() {
        let prices: Vec<f64> = (1..=120).map(|v| v as f64).collect();
        let merged = merged_from(&prices, &prices);
        let request = AnalysisRequest::new(vec![7]).with_ma(false);
        let records = build_records(&merged, &request).unwrap();
        assert!(records.iter().all(|r| r.ma100_1.is_none() && r.ma100_2.is_none()));
    }

    #[test]
    fn test_constant_series_correlates_to_zero() {
        let merged = merged_from(&[5.0; 10], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let records = build_records(&merged, &AnalysisRequest::new(vec![3])).unwrap();
        assert_eq!(records[9].correlation(3), Some(0.0));
    }

    #[test]
    fn test_ratio_mode() {
        let prices1: Vec<f64> = (0..220).map(|i| 100.0 + (i % 10) as f64).collect();
        let prices2: Vec<f64> = vec![50.0; 220];
        let merged = merged_from(&prices1, &prices2);
        let request = AnalysisRequest::new(vec![7]).with_ratio(true);
        let records = build_records(&merged, &request).unwrap();

        let first = records[0].ratio.as_ref().unwrap();
        assert_eq!(first.ratio, Some(2.0));
        assert_eq!(first.ratio_ma100, None);
        assert_eq!(first.dist_ma100_ratio, None);

        let last = records[219].ratio.as_ref().unwrap();
        let ratio = last.ratio.unwrap();
        let ma100 = last.ratio_ma100.unwrap();
        let expected = (ratio - ma100) / ma100 * 100.0;
        assert!((last.dist_ma100_ratio.unwrap() - expected).abs() < 1e-12);
        assert!(last.ratio_ma200.is_some());
        assert!(last.dist_ma200_ratio.is_some());
    }

    #[test]
    fn test_ratio_with_zero_denominator() {
        let merged = merged_from(&[1.0, 2.0, 3.0], &[1.0, 0.0, 1.0]);
        let request = AnalysisRequest::new(vec![2]).with_ratio(true);
        let records = build_records(&merged, &request).unwrap();
        assert_eq!(records[1].ratio.as_ref().unwrap().ratio, None);
        assert_eq!(records[2].ratio.as_ref().unwrap().ratio, Some(3.0));
    }

    #[test]
    fn test_no_ratio_metrics_without_ratio_mode() {
        let merged = merged_from(&[1.0, 2.0], &[1.0, 2.0]);
        let records = build_records(&merged, &AnalysisRequest::new(vec![2])).unwrap();
        assert!(records.iter().all(|r| r.ratio.is_none()));
    }

    #[test]
    fn test_every_window_reported() {
        let prices1: Vec<f64> = (0..40).map(|i| (i * 3 % 7) as f64).collect();
        let prices2: Vec<f64> = (0..40).map(|i| (i * 5 % 11) as f64).collect();
        let merged = merged_from(&prices1, &prices2);
        let records = build_records(&merged, &AnalysisRequest::new(vec![30, 7, 7])).unwrap();

        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.correlations.keys().copied().collect::<Vec<_>>(), vec![7, 30]);
            assert_eq!(record.correlation(7).is_some(), i >= 6);
            assert_eq!(record.correlation(30).is_some(), i >= 29);
        }
    }

    #[test]
    fn test_analyze_pair_with_range_and_cache() {
        let prices: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let merged = merged_from(&prices, &prices);
        let s1 = series("A", &merged, true);
        let s2 = series("B", &merged[5..], false);

        let request = AnalysisRequest::new(vec![3])
            .with_range(Some("1403/01/08".to_string()), Some("1403/01/15".to_string()));
        let mut cache = ConversionCache::new(Duration::seconds(60));

        let result = analyze_pair_with_cache(&s1, &s2, &request, &mut cache).unwrap();
        assert_eq!(result.name1, "A");
        assert_eq!(result.name2, "B");
        assert_eq!(result.len(), 8);
        assert_eq!(result.records[0].date, "1403/01/08");
        assert_eq!(result.records[7].date, "1403/01/15");
        assert_eq!(cache.misses(), 8);

        let again = analyze_pair_with_cache(&s1, &s2, &request, &mut cache).unwrap();
        assert_eq!(again, result);
        assert_eq!(cache.hits(), 8);

        assert_eq!(analyze_pair(&s1, &s2, &request).unwrap(), result);
    }

    #[test]
    fn test_analyze_pair_insufficient_after_alignment() {
        let merged = merged_from(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]);
        let s1 = series("A", &merged[..2], true);
        let s2 = series("B", &merged, false);
        let err = analyze_pair(&s1, &s2, &AnalysisRequest::new(vec![3])).unwrap_err();
        assert_eq!(err, AppError::InsufficientData { available: 2, required: 3 });
    }
}
