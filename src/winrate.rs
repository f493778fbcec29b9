//! Per-model win-rates with Wilson score confidence intervals
//!
//! Two mutually exclusive sources: a precomputed win-rate table when one
//! was supplied, otherwise a derivation from the filtered records (group
//! by model, p = solved / total). Either way, missing interval bounds are
//! filled with the Wilson score interval at 95% confidence, and entries
//! below the minimum sample size are dropped as statistically noisy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{parse_number, NormalizedRecord};

/// z for a 95% two-sided interval.
pub const WILSON_Z: f64 = 1.96;

/// One reported win-rate, ephemeral and recomputed per report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRateEntry {
    pub model: String,
    pub win_rate: f64,
    pub lo: f64,
    pub hi: f64,
    pub n: u64,
}

/// One row of the optional external win-rate table, still in text form.
#[derive(Debug, Clone, Default)]
pub struct ExternalWinRateRow {
    pub model: Option<String>,
    pub wins: Option<String>,
    pub apps: Option<String>,
    pub win_rate: Option<String>,
    pub lo: Option<String>,
    pub hi: Option<String>,
}

/// Wilson score interval for proportion `p` over `n` trials.
/// `n == 0` yields `(0, 0)` rather than dividing by zero.
pub fn wilson_interval(p: f64, n: u64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f64;
    let z2 = WILSON_Z * WILSON_Z;
    let denom = 1.0 + z2 / n;
    let center = p + z2 / (2.0 * n);
    let adj = WILSON_Z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();
    ((center - adj) / denom, (center + adj) / denom)
}

/// Build entries from the external table, preserving source order.
/// Missing win-rates are derived as wins/apps; missing interval bounds
/// are filled via Wilson. Rows without a model name are skipped.
pub fn from_external(rows: &[ExternalWinRateRow], min_n: u64) -> Vec<WinRateEntry> {
    rows.iter()
        .filter_map(|row| {
            let model = row.model.as_deref().unwrap_or("").trim().to_string();
            if model.is_empty() {
                return None;
            }
            let wins = row.wins.as_deref().and_then(parse_number).unwrap_or(0.0);
            let apps = row.apps.as_deref().and_then(parse_number).unwrap_or(0.0);
            let n = if apps > 0.0 { apps as u64 } else { 0 };

            let win_rate = row
                .win_rate
                .as_deref()
                .and_then(parse_number)
                .or_else(|| (n > 0).then(|| wins / apps))
                .unwrap_or(0.0);

            let lo = row.lo.as_deref().and_then(parse_number);
            let hi = row.hi.as_deref().and_then(parse_number);
            let (lo, hi) = match (lo, hi) {
                (Some(lo), Some(hi)) => (lo, hi),
                _ => wilson_interval(win_rate, n),
            };

            Some(WinRateEntry {
                model,
                win_rate,
                lo,
                hi,
                n,
            })
        })
        .filter(|e| e.n >= min_n)
        .collect()
}

/// Derive entries from the filtered records: group by model, count solved.
/// Output is sorted by model name ascending.
pub fn from_records(records: &[&NormalizedRecord], min_n: u64) -> Vec<WinRateEntry> {
    let mut by_model: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for rec in records {
        let slot = by_model.entry(rec.model.as_str()).or_insert((0, 0));
        slot.0 += 1;
        if rec.is_solved {
            slot.1 += 1;
        }
    }

    by_model
        .into_iter()
        .map(|(model, (n, k))| {
            let p = k as f64 / n as f64;
            let (lo, hi) = wilson_interval(p, n);
            WinRateEntry {
                model: model.to_string(),
                win_rate: p,
                lo,
                hi,
                n,
            }
        })
        .filter(|e| e.n >= min_n)
        .collect()
}

/// Verdict on the two best entries by win-rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub best: WinRateEntry,
    pub second: Option<WinRateEntry>,
    /// True when the two confidence intervals intersect, i.e. the lead
    /// is not yet significant.
    pub overlap: bool,
}

/// Identify the best and runner-up models and whether their confidence
/// intervals overlap. `None` when there are no entries at all.
pub fn verdict(entries: &[WinRateEntry]) -> Option<Verdict> {
    let mut ranked: Vec<&WinRateEntry> = entries.iter().collect();
    ranked.sort_by(|a, b| {
        b.win_rate
            .partial_cmp(&a.win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let best = (*ranked.first()?).clone();
    let second = ranked.get(1).map(|e| (*e).clone());
    let overlap = second
        .as_ref()
        .map(|s| best.lo <= s.hi && best.hi >= s.lo)
        .unwrap_or(false);
    Some(Verdict {
        best,
        second,
        overlap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_date;

    fn rec(model: &str, solved: bool) -> NormalizedRecord {
        NormalizedRecord {
            date: parse_date("2024-03-05").unwrap(),
            model: model.to_string(),
            topic: "t".to_string(),
            user_text: String::new(),
            tts: None,
            is_solved: solved,
            fit: None,
        }
    }

    fn entry(model: &str, p: f64, lo: f64, hi: f64, n: u64) -> WinRateEntry {
        WinRateEntry {
            model: model.to_string(),
            win_rate: p,
            lo,
            hi,
            n,
        }
    }

    #[test]
    fn test_wilson_bounds_ordering() {
        for &(p, n) in &[(0.0, 10), (0.5, 10), (1.0, 10), (0.3, 200), (0.97, 35)] {
            let (lo, hi) = wilson_interval(p, n);
            assert!(0.0 <= lo, "lo >= 0 for p={p} n={n}");
            assert!(lo <= p + 1e-12, "lo <= p for p={p} n={n}");
            assert!(p <= hi + 1e-12, "p <= hi for p={p} n={n}");
            assert!(hi <= 1.0, "hi <= 1 for p={p} n={n}");
        }
    }

    #[test]
    fn test_wilson_zero_sample_guard() {
        assert_eq!(wilson_interval(0.5, 0), (0.0, 0.0));
    }

    #[test]
    fn test_wilson_interval_narrows_with_n() {
        let (lo_small, hi_small) = wilson_interval(0.6, 20);
        let (lo_big, hi_big) = wilson_interval(0.6, 2000);
        assert!(hi_big - lo_big < hi_small - lo_small);
    }

    #[test]
    fn test_from_records_groups_and_sorts_by_model() {
        let records = vec![
            rec("zeta", true),
            rec("alpha", true),
            rec("alpha", false),
            rec("zeta", true),
        ];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let entries = from_records(&refs, 0);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].model, "alpha");
        assert_eq!(entries[0].win_rate, 0.5);
        assert_eq!(entries[0].n, 2);
        assert_eq!(entries[1].model, "zeta");
        assert_eq!(entries[1].win_rate, 1.0);
    }

    #[test]
    fn test_min_n_guard_applies_to_derived_entries() {
        let records: Vec<NormalizedRecord> = (0..5)
            .map(|i| rec(if i < 4 { "big" } else { "small" }, true))
            .collect();
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let entries = from_records(&refs, 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].model, "big");
        for e in &entries {
            assert!(e.n >= 2);
        }
    }

    #[test]
    fn test_from_external_preserves_source_order() {
        let rows = vec![
            ExternalWinRateRow {
                model: Some("zeta".to_string()),
                wins: Some("30".to_string()),
                apps: Some("60".to_string()),
                ..ExternalWinRateRow::default()
            },
            ExternalWinRateRow {
                model: Some("alpha".to_string()),
                wins: Some("50".to_string()),
                apps: Some("60".to_string()),
                ..ExternalWinRateRow::default()
            },
        ];
        let entries = from_external(&rows, 0);
        assert_eq!(entries[0].model, "zeta");
        assert_eq!(entries[1].model, "alpha");
    }

    #[test]
    fn test_from_external_derives_rate_and_interval() {
        let rows = vec![ExternalWinRateRow {
            model: Some("gpt-x".to_string()),
            wins: Some("45".to_string()),
            apps: Some("60".to_string()),
            ..ExternalWinRateRow::default()
        }];
        let entries = from_external(&rows, 0);
        let e = &entries[0];
        assert!((e.win_rate - 0.75).abs() < 1e-12);
        assert!(e.lo < e.win_rate && e.win_rate < e.hi);
        assert_eq!(e.n, 60);
    }

    #[test]
    fn test_from_external_keeps_precomputed_bounds() {
        let rows = vec![ExternalWinRateRow {
            model: Some("gpt-x".to_string()),
            apps: Some("100".to_string()),
            win_rate: Some("0.7".to_string()),
            lo: Some("0.6".to_string()),
            hi: Some("0.8".to_string()),
            ..ExternalWinRateRow::default()
        }];
        let entries = from_external(&rows, 0);
        assert_eq!(entries[0].lo, 0.6);
        assert_eq!(entries[0].hi, 0.8);
    }

    #[test]
    fn test_from_external_skips_nameless_and_small_samples() {
        let rows = vec![
            ExternalWinRateRow {
                model: Some("  ".to_string()),
                apps: Some("100".to_string()),
                ..ExternalWinRateRow::default()
            },
            ExternalWinRateRow {
                model: Some("tiny".to_string()),
                wins: Some("3".to_string()),
                apps: Some("5".to_string()),
                ..ExternalWinRateRow::default()
            },
        ];
        assert!(from_external(&rows, 30).is_empty());
    }

    #[test]
    fn test_verdict_overlap() {
        let entries = vec![
            entry("a", 0.70, 0.60, 0.80, 100),
            entry("b", 0.65, 0.55, 0.75, 100),
        ];
        let v = verdict(&entries).unwrap();
        assert_eq!(v.best.model, "a");
        assert_eq!(v.second.as_ref().unwrap().model, "b");
        assert!(v.overlap);
    }

    #[test]
    fn test_verdict_separated() {
        let entries = vec![
            entry("a", 0.90, 0.85, 0.95, 400),
            entry("b", 0.60, 0.55, 0.65, 400),
        ];
        let v = verdict(&entries).unwrap();
        assert_eq!(v.best.model, "a");
        assert!(!v.overlap);
    }

    #[test]
    fn test_verdict_single_entry_and_empty() {
        let v = verdict(&[entry("only", 0.5, 0.4, 0.6, 50)]).unwrap();
        assert!(v.second.is_none());
        assert!(!v.overlap);
        assert!(verdict(&[]).is_none());
    }
}
