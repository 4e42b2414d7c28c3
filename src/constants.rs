//! Export Format and Analysis Constants
//!
//! ## Vendor Export Format
//!
//! Daily price exports carry a single header row whose cells are bracketed
//! column names, followed by comma-separated values:
//!
//! ```text
//! <TICKER>,<DTYYYYMMDD>,<FIRST>,<HIGH>,<LOW>,<CLOSE>,<VALUE>,<VOL>,<OPENINT>,<PER>,<OPEN>,<LAST>
//! Foolad,20240320,5120.00,5200.00,5080.00,5170.00,...
//! ```
//!
//! Only the date and close columns are required. Column lookup is by marker,
//! not by position, so exports with reordered or extra columns still parse.

/// Header marker of the Gregorian date column (values are `YYYYMMDD`)
pub const DATE_COLUMN_MARKER: &str = "<DTYYYYMMDD>";

/// Header marker of the closing price column
pub const CLOSE_COLUMN_MARKER: &str = "<CLOSE>";

/// Header marker of the optional instrument name column
pub const TICKER_COLUMN_MARKER: &str = "<TICKER>";

/// Instrument name used when the export has no usable ticker value
pub const UNKNOWN_INSTRUMENT: &str = "Unknown";

/// Short moving average period shown alongside each price
pub const MA_SHORT_PERIOD: usize = 100;

/// Long moving average period shown alongside each price
pub const MA_LONG_PERIOD: usize = 200;

/// Correlation windows used when a request does not name any
pub const DEFAULT_WINDOWS: &[usize] = &[7, 30, 90];

/// Decimal places kept on correlation values
pub const CORRELATION_DECIMALS: i32 = 4;

/// Supported Jalali years (inclusive). Maps to roughly Gregorian 1621-2121.
pub const MIN_JALALI_YEAR: i32 = 1000;
pub const MAX_JALALI_YEAR: i32 = 1500;

/// Timezone used to decide what "today" is for the exchange
pub const EXCHANGE_TIMEZONE: &str = "Asia/Tehran";

/// Default lifetime of cached calendar conversions, in seconds
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;
