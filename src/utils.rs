pub mod conversion_cache;

pub use conversion_cache::{CachedConversion, ConversionCache};

use crate::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_WINDOWS};
use crate::models::AnalysisRequest;

/// Get default correlation windows from environment variable or use default
///
/// `PAIRTREND_WINDOWS` is a comma-separated list such as "7,30,90".
/// An unparseable or empty value falls back to the built-in windows.
pub fn get_default_windows() -> Vec<usize> {
    windows_from(std::env::var("PAIRTREND_WINDOWS").ok().as_deref())
}

fn windows_from(value: Option<&str>) -> Vec<usize> {
    match value.map(AnalysisRequest::parse_windows) {
        Some(Ok(windows)) if !windows.is_empty() && !windows.contains(&0) => windows,
        Some(_) => {
            tracing::warn!("Ignoring invalid PAIRTREND_WINDOWS, using defaults {:?}", DEFAULT_WINDOWS);
            DEFAULT_WINDOWS.to_vec()
        }
        None => DEFAULT_WINDOWS.to_vec(),
    }
}

/// Get calendar cache lifetime from environment variable or use default
pub fn get_cache_ttl() -> chrono::Duration {
    let secs = std::env::var("PAIRTREND_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|&s| s > 0)
        .unwrap_or(DEFAULT_CACHE_TTL_SECS);
    chrono::Duration::seconds(secs)
}
