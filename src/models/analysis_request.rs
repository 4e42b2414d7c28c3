use crate::constants::DEFAULT_WINDOWS;
use crate::error::{AppError, Result};

/// Parameters for one pair comparison
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Rolling correlation window sizes, in trading days
    pub windows: Vec<usize>,

    /// Fill MA100/MA200 for both instruments
    pub include_ma: bool,

    /// Also analyse price1 / price2 as a series of its own
    pub ratio: bool,

    /// Inclusive Jalali lower bound (`YYYY/MM/DD`)
    pub start: Option<String>,

    /// Inclusive Jalali upper bound (`YYYY/MM/DD`)
    pub end: Option<String>,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS.to_vec(),
            include_ma: true,
            ratio: false,
            start: None,
            end: None,
        }
    }
}

impl AnalysisRequest {
    pub fn new(windows: Vec<usize>) -> Self {
        Self {
            windows,
            ..Self::default()
        }
    }

    pub fn with_ratio(mut self, ratio: bool) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_ma(mut self, include_ma: bool) -> Self {
        self.include_ma = include_ma;
        self
    }

    pub fn with_range(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Window sizes sorted ascending with duplicates removed
    pub fn normalized_windows(&self) -> Vec<usize> {
        let mut windows = self.windows.clone();
        windows.sort_unstable();
        windows.dedup();
        windows
    }

    /// Fewest aligned points that still let every output column warm up eventually
    pub fn min_required_points(&self) -> usize {
        self.windows.iter().copied().min().unwrap_or(1).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.windows.iter().any(|&w| w == 0) {
            return Err(AppError::InvalidInput(
                "window sizes must be positive".to_string(),
            ));
        }
        if self.windows.is_empty() && !self.ratio {
            return Err(AppError::InvalidInput(
                "at least one correlation window is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a comma-separated window list such as "7,30,90"
    pub fn parse_windows(s: &str) -> Result<Vec<usize>> {
        s.split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|e| AppError::InvalidInput(format!("Invalid window '{}': {}", part, e)))
            })
            .collect()
    }
}
