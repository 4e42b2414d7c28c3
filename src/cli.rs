use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "pairtrend")]
#[command(about = "Compare two exchange-traded instruments over their shared trading history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Correlate a base export against one or more comparison exports
    Analyze {
        /// Daily export of the base instrument
        base: PathBuf,

        /// Daily exports to compare against the base
        #[arg(required = true, num_args = 1..)]
        others: Vec<PathBuf>,

        /// Comma-separated correlation windows (default: PAIRTREND_WINDOWS or 7,30,90)
        #[arg(short, long)]
        windows: Option<String>,

        /// Add the price ratio series with its moving averages
        #[arg(short, long)]
        ratio: bool,

        /// Leave MA100/MA200 columns empty
        #[arg(long)]
        no_ma: bool,

        /// Inclusive Jalali start date (YYYY/MM/DD)
        #[arg(long)]
        start: Option<String>,

        /// Inclusive Jalali end date (YYYY/MM/DD)
        #[arg(long)]
        end: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Convert between a YYYYMMDD Gregorian key and a YYYY/MM/DD Jalali date
    Convert {
        date: String,
    },
    /// Print today's Jalali date on the exchange
    Today,
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            base,
            others,
            windows,
            ratio,
            no_ma,
            start,
            end,
            format,
        } => {
            commands::analyze::run(commands::analyze::AnalyzeArgs {
                base,
                others,
                windows,
                ratio,
                include_ma: !no_ma,
                start,
                end,
                format,
            });
        }
        Commands::Convert { date } => {
            commands::convert::run(&date);
        }
        Commands::Today => {
            commands::today::run();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_args() {
        let cli = Cli::try_parse_from([
            "pairtrend", "analyze", "a.csv", "b.csv", "c.csv", "-w", "7,30", "--ratio", "--format", "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { base, others, windows, ratio, no_ma, format, .. } => {
                assert_eq!(base, PathBuf::from("a.csv"));
                assert_eq!(others.len(), 2);
                assert_eq!(windows.as_deref(), Some("7,30"));
                assert!(ratio);
                assert!(!no_ma);
                assert_eq!(format, OutputFormat::Csv);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_requires_comparison_file() {
        assert!(Cli::try_parse_from(["pairtrend", "analyze", "a.csv"]).is_err());
    }
}
