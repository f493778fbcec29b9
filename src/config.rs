//! Analysis configuration threaded explicitly through the pipeline

use clap::ValueEnum;

/// Interpretation of the fit score column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FitScale {
    /// Fit scores are percentages (0-100).
    #[default]
    #[value(name = "0-100")]
    ZeroHundred,
    /// Fit scores are fractions (0-1).
    #[value(name = "0-1")]
    ZeroOne,
}

impl FitScale {
    pub fn is_percent(self) -> bool {
        matches!(self, FitScale::ZeroHundred)
    }
}

/// All knobs consumed by normalization and aggregation. Passed by value to
/// every stage; there is no ambient configuration state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub fit_scale: FitScale,
    /// Turn-count label shown next to the solved-rate KPI. Display only.
    pub solved_threshold: f64,
    pub use_heuristics: bool,
    /// Minimum sample size for a win-rate entry to be reported.
    pub min_n_winrate: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fit_scale: FitScale::ZeroHundred,
            solved_threshold: 6.0,
            use_heuristics: true,
            min_n_winrate: 30,
        }
    }
}
