use crate::cli::OutputFormat;
use crate::error::{AppError, Result};
use crate::models::{AnalysisRequest, AnalysisSeries};
use crate::services::{analyze_pair_with_cache, parse_csv_file};
use crate::utils::{get_cache_ttl, get_default_windows, ConversionCache};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub struct AnalyzeArgs {
    pub base: PathBuf,
    pub others: Vec<PathBuf>,
    pub windows: Option<String>,
    pub ratio: bool,
    pub include_ma: bool,
    pub start: Option<String>,
    pub end: Option<String>,
    pub format: OutputFormat,
}

pub fn run(args: AnalyzeArgs) {
    match analyze(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_request(args: &AnalyzeArgs) -> Result<AnalysisRequest> {
    let windows = match &args.windows {
        Some(list) => AnalysisRequest::parse_windows(list)?,
        None => get_default_windows(),
    };
    let request = AnalysisRequest::new(windows)
        .with_ratio(args.ratio)
        .with_ma(args.include_ma)
        .with_range(args.start.clone(), args.end.clone());
    request.validate()?;
    Ok(request)
}

fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let request = build_request(args)?;
    let base = parse_csv_file(&args.base)?;
    info!("Base {}: {} point(s) from {}", base.name, base.len(), args.base.display());

    let mut cache = ConversionCache::new(get_cache_ttl());
    let mut results = Vec::with_capacity(args.others.len());
    for path in &args.others {
        let other = parse_csv_file(path)?;
        results.push(analyze_pair_with_cache(&base, &other, &request, &mut cache)?);
    }
    info!(
        "Date conversions: {} cached, {} computed",
        cache.hits(),
        cache.misses()
    );

    let stdout = std::io::stdout();
    let handle = stdout.lock();
    match args.format {
        OutputFormat::Json => write_json(&results, handle),
        OutputFormat::Csv => write_csv(&results, args.ratio, handle),
    }
}

/// One JSON document: a single series object, or an array for several pairs
pub fn write_json<W: Write>(results: &[AnalysisSeries], mut out: W) -> Result<()> {
    let json = match results {
        [single] => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    }
    .map_err(|e| AppError::Io(format!("JSON error: {}", e)))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or(String::new(), |v| v.to_string())
}

/// Flat table with one `corr_<W>` column per window; empty cells are missing values
pub fn write_csv<W: Write>(results: &[AnalysisSeries], ratio: bool, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let windows = results.first().map(|r| r.windows.clone()).unwrap_or_default();

    let mut header: Vec<String> = [
        "name1", "name2", "date", "gregorian", "timestamp", "price1", "price2",
        "ma100_1", "ma100_2", "ma200_1", "ma200_2",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(windows.iter().map(|w| format!("corr_{}", w)));
    if ratio {
        header.extend(
            ["ratio", "ratio_ma100", "ratio_ma200", "dist_ma100_ratio", "dist_ma200_ratio"]
                .iter()
                .map(|s| s.to_string()),
        );
    }
    writer.write_record(&header)?;

    for series in results {
        for record in &series.records {
            let mut row = vec![
                series.name1.clone(),
                series.name2.clone(),
                record.date.clone(),
                record.gregorian.clone(),
                record.timestamp.to_string(),
                record.price1.to_string(),
                record.price2.to_string(),
                fmt_opt(record.ma100_1),
                fmt_opt(record.ma100_2),
                fmt_opt(record.ma200_1),
                fmt_opt(record.ma200_2),
            ];
            row.extend(windows.iter().map(|&w| fmt_opt(record.correlation(w))));
            if ratio {
                let metrics = record.ratio.as_ref();
                row.push(fmt_opt(metrics.and_then(|m| m.ratio)));
                row.push(fmt_opt(metrics.and_then(|m| m.ratio_ma100)));
                row.push(fmt_opt(metrics.and_then(|m| m.ratio_ma200)));
                row.push(fmt_opt(metrics.and_then(|m| m.dist_ma100_ratio)));
                row.push(fmt_opt(metrics.and_then(|m| m.dist_ma200_ratio)));
            }
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    Ok(())
}
