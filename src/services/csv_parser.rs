use crate::constants::{CLOSE_COLUMN_MARKER, DATE_COLUMN_MARKER, TICKER_COLUMN_MARKER, UNKNOWN_INSTRUMENT};
use crate::error::{AppError, Result};
use crate::models::{ParsedSeries, RawPoint};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Positions of the columns we read, resolved from the header row
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnLayout {
    date: usize,
    close: usize,
    ticker: Option<usize>,
}

fn find_column(headers: &StringRecord, marker: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.to_uppercase().contains(marker))
}

/// Locate required and optional columns by header marker
fn resolve_layout(headers: &StringRecord) -> Result<ColumnLayout> {
    let date = find_column(headers, DATE_COLUMN_MARKER);
    let close = find_column(headers, CLOSE_COLUMN_MARKER);

    match (date, close) {
        (Some(date), Some(close)) => Ok(ColumnLayout {
            date,
            close,
            ticker: find_column(headers, TICKER_COLUMN_MARKER),
        }),
        _ => {
            let mut missing = Vec::new();
            if date.is_none() {
                missing.push(DATE_COLUMN_MARKER.to_string());
            }
            if close.is_none() {
                missing.push(CLOSE_COLUMN_MARKER.to_string());
            }
            Err(AppError::Format { missing })
        }
    }
}

/// Parse a vendor daily export from any reader
///
/// Rows with an empty date or a close that is not a finite number are
/// skipped. Points come back sorted ascending by date.
pub fn parse_csv_reader<R: Read>(reader: R) -> Result<ParsedSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Trailing columns vary between exports
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let layout = resolve_layout(&headers)?;

    let mut name: Option<String> = None;
    let mut points = Vec::new();
    let mut skipped = 0;

    for result in reader.records() {
        let record = result?;

        if name.is_none() {
            if let Some(ticker) = layout.ticker.and_then(|idx| record.get(idx)) {
                if !ticker.is_empty() {
                    name = Some(ticker.to_string());
                }
            }
        }

        let date = record.get(layout.date).unwrap_or("");
        let close = record
            .get(layout.close)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite());

        match close {
            Some(close) if !date.is_empty() => points.push(RawPoint::new(date, close)),
            _ => skipped += 1,
        }
    }

    points.sort_by(|a, b| a.date.cmp(&b.date));

    let name = name.unwrap_or_else(|| UNKNOWN_INSTRUMENT.to_string());
    if skipped > 0 {
        warn!("{}: skipped {} row(s) with empty date or invalid close", name, skipped);
    }
    debug!("{}: parsed {} point(s)", name, points.len());

    Ok(ParsedSeries {
        name,
        points,
        skipped,
    })
}

/// Parse a vendor daily export held in memory
pub fn parse_csv_str(text: &str) -> Result<ParsedSeries> {
    parse_csv_reader(text.as_bytes())
}

/// Parse a vendor daily export from disk
pub fn parse_csv_file(path: &Path) -> Result<ParsedSeries> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    parse_csv_reader(std::io::BufReader::new(file))
}
