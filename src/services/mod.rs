pub mod calendar;
mod csv_parser;
pub mod date_aligner;
pub mod series_builder;

pub use calendar::{gregorian_to_jalali, jalali_to_gregorian, today_jalali, JalaliDate};
pub use csv_parser::{parse_csv_file, parse_csv_reader, parse_csv_str};
pub use date_aligner::{align, filter_by_jalali_range};
pub use series_builder::{analyze_pair, analyze_pair_with_cache, build_records, build_records_with_cache};
