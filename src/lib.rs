//! usagelens - batch analyzer for LLM usage logs
//!
//! This library ingests tabular usage records (model, timestamp, user
//! text, topic, time-to-solve proxy, solved flag, fit score), normalizes
//! them with optional heuristic inference of missing fields, filters by
//! date/model/topic, and derives analyst-facing aggregates: daily trends,
//! TTS distribution statistics, a topic x model solved-rate heatmap,
//! per-model win-rates with Wilson confidence intervals, and n-gram
//! frequency tables.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod filter;
pub mod loader;
pub mod ngram;
pub mod normalize;
pub mod record;
pub mod report;
pub mod store;
pub mod winrate;
