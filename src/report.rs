//! Plain-text analyst report
//!
//! The crate's stand-in for a chart surface: fixed-width tables printed to
//! stdout, one section per aggregate, each with an explicit empty marker
//! when there is nothing to show.

use crate::aggregate::{Heatmap, Kpi, TrendPoint, TtsDistribution};
use crate::config::AnalysisConfig;
use crate::ngram::TermFrequency;
use crate::winrate::{Verdict, WinRateEntry};

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

pub fn print_kpis(kpi: &Kpi, config: &AnalysisConfig) {
    println!("=== KPIs ===");
    println!("records:      {}", kpi.total);
    println!("median TTS:   {}", fmt_opt(kpi.median_tts));
    println!(
        "solved rate:  {:.1}% (threshold label: {} turns)",
        kpi.solved_rate * 100.0,
        config.solved_threshold
    );
    let fit = match kpi.mean_fit01 {
        Some(f) if config.fit_scale.is_percent() => format!("{:.1}", f * 100.0),
        Some(f) => format!("{f:.2}"),
        None => "-".to_string(),
    };
    println!("mean fit:     {fit}");
    println!();
}

pub fn print_trend(points: &[TrendPoint]) {
    println!("=== Daily trend ===");
    if points.is_empty() {
        println!("(no records)");
        println!();
        return;
    }
    println!("{:<12} {:>8} {:>12}", "day", "volume", "median TTS");
    for p in points {
        println!("{:<12} {:>8} {:>12}", p.day, p.volume, fmt_opt(p.median_tts));
    }
    println!();
}

pub fn print_distribution(dist: Option<&TtsDistribution>) {
    println!("=== TTS distribution ===");
    match dist {
        Some(d) => {
            println!("samples: {}   Q1: {:.2}   Q3: {:.2}", d.values.len(), d.q1, d.q3);
        }
        None => println!("(no TTS values)"),
    }
    println!();
}

pub fn print_heatmap(heatmap: &Heatmap) {
    println!("=== Solved rate by topic x model ===");
    if heatmap.cells.is_empty() {
        println!("(no records)");
        println!();
        return;
    }
    let topic_width = heatmap
        .topics
        .iter()
        .map(|t| t.len())
        .max()
        .unwrap_or(5)
        .max(5);
    print!("{:<topic_width$}", "topic");
    for model in &heatmap.models {
        print!(" {model:>12}");
    }
    println!();
    for (topic, row) in heatmap.topics.iter().zip(&heatmap.cells) {
        print!("{topic:<topic_width$}");
        for cell in row {
            match cell {
                Some(v) => print!(" {v:>12.1}"),
                None => print!(" {:>12}", "-"),
            }
        }
        println!();
    }
    println!();
}

pub fn print_winrate(entries: &[WinRateEntry], verdict: Option<&Verdict>, config: &AnalysisConfig) {
    println!(
        "=== Win-rate (Wilson 95% CI, min n = {}) ===",
        config.min_n_winrate
    );
    if entries.is_empty() {
        println!("(no entries above the sample-size threshold)");
        println!();
        return;
    }
    println!(
        "{:<20} {:>9} {:>9} {:>9} {:>8}",
        "model", "win_rate", "ci_low", "ci_high", "n"
    );
    for e in entries {
        println!(
            "{:<20} {:>9.3} {:>9.3} {:>9.3} {:>8}",
            e.model, e.win_rate, e.lo, e.hi, e.n
        );
    }
    if let Some(v) = verdict {
        let significance = match (&v.second, v.overlap) {
            (None, _) => String::new(),
            (Some(_), true) => " Lead not yet significant (CIs overlap).".to_string(),
            (Some(_), false) => " Lead is significant (CIs do not overlap).".to_string(),
        };
        println!(
            "Best model: {} ({:.1}%).{}",
            v.best.model,
            v.best.win_rate * 100.0,
            significance
        );
    }
    println!();
}

pub fn print_ngrams(terms: &[TermFrequency]) {
    println!("=== Top terms (unigrams + bigrams) ===");
    if terms.is_empty() {
        println!("(no terms)");
        println!();
        return;
    }
    println!("{:<24} {:>8}", "term", "freq");
    for t in terms {
        println!("{:<24} {:>8}", t.term, t.freq);
    }
    let top: Vec<&str> = terms.iter().take(5).map(|t| t.term.as_str()).collect();
    println!("Top terms: {}", top.join(", "));
    println!();
}
