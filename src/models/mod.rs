mod analysis_record;
mod analysis_request;
mod price_point;
pub mod indicators;

pub use analysis_record::{AnalysisRecord, AnalysisSeries, Correlations, RatioMetrics};
pub use analysis_request::AnalysisRequest;
pub use price_point::{MergedPoint, ParsedSeries, RawPoint};
