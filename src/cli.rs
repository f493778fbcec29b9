//! CLI argument parsing for usagelens

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::config::{AnalysisConfig, FitScale};

#[derive(Parser, Debug)]
#[command(name = "usagelens")]
#[command(version)]
#[command(about = "Analyze LLM usage logs: trends, win-rates, and n-grams", long_about = None)]
pub struct Cli {
    /// Usage table (CSV with header row: date, model, user_text, topic,
    /// tts, is_solved, fit_score; optional turn, conversation)
    #[arg(value_name = "USAGE_CSV")]
    pub data: PathBuf,

    /// Optional precomputed win-rate table (model, wins, apps, win_rate, wr_lo, wr_hi)
    #[arg(long, value_name = "FILE")]
    pub winrate: Option<PathBuf>,

    /// Optional precomputed term-frequency table (term, freq)
    #[arg(long, value_name = "FILE")]
    pub ngrams: Option<PathBuf>,

    /// Keep only records on or after this day
    #[arg(long = "date-start", value_name = "YYYY-MM-DD")]
    pub date_start: Option<NaiveDate>,

    /// Keep only records on or before this day (inclusive)
    #[arg(long = "date-end", value_name = "YYYY-MM-DD")]
    pub date_end: Option<NaiveDate>,

    /// Restrict to these models (repeatable; default: all)
    #[arg(long = "model", value_name = "NAME")]
    pub models: Vec<String>,

    /// Restrict to these topics (repeatable; default: all)
    #[arg(long = "topic", value_name = "NAME")]
    pub topics: Vec<String>,

    /// Interpretation of the fit score column
    #[arg(long = "fit-scale", value_enum, default_value = "0-100")]
    pub fit_scale: FitScale,

    /// Turn-count label shown next to the solved-rate KPI
    #[arg(long = "solved-threshold", value_name = "TURNS", default_value = "6")]
    pub solved_threshold: f64,

    /// Disable heuristic inference of missing turn counts and solved flags
    #[arg(long = "no-heuristics")]
    pub no_heuristics: bool,

    /// Minimum sample size for a win-rate entry to be reported
    #[arg(long = "min-n-winrate", value_name = "N", default_value = "30")]
    pub min_n_winrate: u64,

    /// Write the filtered record set to this CSV file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            fit_scale: self.fit_scale,
            solved_threshold: self.solved_threshold,
            use_heuristics: !self.no_heuristics,
            min_n_winrate: self.min_n_winrate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["usagelens", "usage.csv"]);
        assert_eq!(cli.data, PathBuf::from("usage.csv"));
        assert!(cli.winrate.is_none());
        assert!(!cli.no_heuristics);
        assert_eq!(cli.min_n_winrate, 30);
        assert_eq!(cli.fit_scale, FitScale::ZeroHundred);
        assert_eq!(cli.solved_threshold, 6.0);
    }

    #[test]
    fn test_cli_fit_scale_values() {
        let cli = Cli::parse_from(["usagelens", "usage.csv", "--fit-scale", "0-1"]);
        assert_eq!(cli.fit_scale, FitScale::ZeroOne);
    }

    #[test]
    fn test_cli_repeatable_selections() {
        let cli = Cli::parse_from([
            "usagelens",
            "usage.csv",
            "--model",
            "gpt-x",
            "--model",
            "claude-y",
            "--topic",
            "billing",
        ]);
        assert_eq!(cli.models, vec!["gpt-x", "claude-y"]);
        assert_eq!(cli.topics, vec!["billing"]);
    }

    #[test]
    fn test_cli_date_bounds() {
        let cli = Cli::parse_from([
            "usagelens",
            "usage.csv",
            "--date-start",
            "2024-03-01",
            "--date-end",
            "2024-03-31",
        ]);
        assert_eq!(cli.date_start.unwrap().to_string(), "2024-03-01");
        assert_eq!(cli.date_end.unwrap().to_string(), "2024-03-31");
    }

    #[test]
    fn test_cli_analysis_config() {
        let cli = Cli::parse_from([
            "usagelens",
            "usage.csv",
            "--no-heuristics",
            "--min-n-winrate",
            "5",
        ]);
        let config = cli.analysis_config();
        assert!(!config.use_heuristics);
        assert_eq!(config.min_n_winrate, 5);
    }
}
