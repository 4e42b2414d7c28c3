use serde::Serialize;
use std::collections::BTreeMap;

/// Correlation per window size, `None` during the window's warm-up period
pub type Correlations = BTreeMap<usize, Option<f64>>;

/// One output row per aligned trading date
///
/// Every field needed for charting is carried on the record itself.
/// Windowed values are `None` (serialised as `null`) until enough history
/// exists, which keeps "no signal yet" apart from a computed zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    /// Jalali display date (`YYYY/MM/DD`)
    pub date: String,

    /// Gregorian key the record was built from (`YYYYMMDD`)
    pub gregorian: String,

    /// Epoch milliseconds of the Gregorian date at midnight UTC
    pub timestamp: i64,

    pub price1: f64,
    pub price2: f64,

    pub ma100_1: Option<f64>,
    pub ma100_2: Option<f64>,
    pub ma200_1: Option<f64>,
    pub ma200_2: Option<f64>,

    /// Rolling Pearson correlation keyed by window size, rounded to 4 decimals
    pub correlations: Correlations,

    /// Present only for ratio-mode requests
    #[serde(flatten)]
    pub ratio: Option<RatioMetrics>,
}

impl AnalysisRecord {
    /// Correlation for a window, if it was requested and is past warm-up
    pub fn correlation(&self, window: usize) -> Option<f64> {
        self.correlations.get(&window).copied().flatten()
    }
}

/// price1 / price2 treated as a series of its own
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioMetrics {
    /// `None` when price2 is zero
    pub ratio: Option<f64>,
    pub ratio_ma100: Option<f64>,
    pub ratio_ma200: Option<f64>,
    /// ((ratio - ratio_ma100) / ratio_ma100) * 100
    pub dist_ma100_ratio: Option<f64>,
    /// ((ratio - ratio_ma200) / ratio_ma200) * 100
    pub dist_ma200_ratio: Option<f64>,
}

/// Full output of one pair comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSeries {
    pub name1: String,
    pub name2: String,
    pub windows: Vec<usize>,
    pub records: Vec<AnalysisRecord>,
}

impl AnalysisSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-window correlation on the most recent aligned date
    pub fn latest_correlations(&self) -> Correlations {
        self.records
            .last()
            .map(|r| r.correlations.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ratio: Option<RatioMetrics>) -> AnalysisRecord {
        let mut correlations = Correlations::new();
        correlations.insert(7, None);
        correlations.insert(30, Some(0.8123));
        AnalysisRecord {
            date: "1403/01/01".to_string(),
            gregorian: "20240320".to_string(),
            timestamp: 1_710_892_800_000,
            price1: 100.0,
            price2: 50.0,
            ma100_1: None,
            ma100_2: None,
            ma200_1: None,
            ma200_2: None,
            correlations,
            ratio,
        }
    }

    #[test]
    fn test_correlation_lookup() {
        let r = record(None);
        assert_eq!(r.correlation(30), Some(0.8123));
        assert_eq!(r.correlation(7), None);
        assert_eq!(r.correlation(90), None);
    }

    #[test]
    fn test_serialize_nulls_and_window_keys() {
        let json = serde_json::to_value(record(None)).unwrap();
        assert!(json["ma100_1"].is_null());
        assert!(json["correlations"]["7"].is_null());
        assert_eq!(json["correlations"]["30"], 0.8123);
        assert!(json.get("ratio").is_none());
    }

    #[test]
    fn test_serialize_flattens_ratio_metrics() {
        let metrics = RatioMetrics {
            ratio: Some(2.0),
            ratio_ma100: None,
            ratio_ma200: None,
            dist_ma100_ratio: None,
            dist_ma200_ratio: None,
        };
        let json = serde_json::to_value(record(Some(metrics))).unwrap();
        assert_eq!(json["ratio"], 2.0);
        assert!(json["dist_ma100_ratio"].is_null());
    }

    #[test]
    fn test_latest_correlations() {
        let series = AnalysisSeries {
            name1: "A".to_string(),
            name2: "B".to_string(),
            windows: vec![7, 30],
            records: vec![record(None)],
        };
        assert_eq!(series.latest_correlations().get(&30), Some(&Some(0.8123)));

        let empty = AnalysisSeries { records: Vec::new(), ..series };
        assert!(empty.latest_correlations().is_empty());
    }
}
