use serde::{Deserialize, Serialize};

/// A single daily close as read from a vendor export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// Gregorian trading date as an 8-digit `YYYYMMDD` key
    pub date: String,

    /// Closing price
    pub close: f64,
}

impl RawPoint {
    pub fn new(date: impl Into<String>, close: f64) -> Self {
        Self {
            date: date.into(),
            close,
        }
    }
}

/// Closing prices of both instruments on a date they both traded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    /// Gregorian trading date as an 8-digit `YYYYMMDD` key
    pub date: String,

    /// Close of the first (base) instrument
    pub price1: f64,

    /// Close of the second (comparison) instrument
    pub price2: f64,
}

/// Result of ingesting one export: the instrument name and its sorted closes
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSeries {
    pub name: String,
    /// Ascending by date
    pub points: Vec<RawPoint>,
    /// Rows dropped for an empty date or unparseable close
    pub skipped: usize,
}

impl ParsedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}
