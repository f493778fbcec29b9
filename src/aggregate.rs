//! Trend, distribution, heatmap, and KPI aggregates
//!
//! Each aggregator is a pure read of the filtered view and degrades to an
//! explicit empty value on empty input. Quantiles use the linear
//! interpolation estimator (position = (n-1)*q).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::FitScale;
use crate::record::NormalizedRecord;

/// Median over the finite values of `values`. `None` when nothing is finite.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = finite.len() / 2;
    Some(if finite.len() % 2 == 1 {
        finite[mid]
    } else {
        (finite[mid - 1] + finite[mid]) / 2.0
    })
}

/// Quantile `q` in [0, 1] over the finite values, linearly interpolated
/// between the two nearest order statistics.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = (finite.len() - 1) as f64 * q;
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    Some(match finite.get(base + 1) {
        Some(&next) => finite[base] + rest * (next - finite[base]),
        None => finite[base],
    })
}

/// One calendar day of the volume/TTS trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// "YYYY-MM-DD" bucket key; lexicographic order is chronological.
    pub day: String,
    pub volume: u64,
    pub median_tts: Option<f64>,
}

/// Daily volume and median TTS, days ascending.
pub fn trend(records: &[&NormalizedRecord]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut volumes: BTreeMap<String, u64> = BTreeMap::new();
    for rec in records {
        let key = rec.day_key();
        *volumes.entry(key.clone()).or_insert(0) += 1;
        if let Some(tts) = rec.tts {
            by_day.entry(key).or_default().push(tts);
        }
    }
    volumes
        .into_iter()
        .map(|(day, volume)| {
            let median_tts = by_day.get(&day).and_then(|v| median(v));
            TrendPoint {
                day,
                volume,
                median_tts,
            }
        })
        .collect()
}

/// Quartile summary of the finite TTS values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TtsDistribution {
    pub values: Vec<f64>,
    pub q1: f64,
    pub q3: f64,
}

/// `None` when the view holds no finite TTS at all.
pub fn tts_distribution(records: &[&NormalizedRecord]) -> Option<TtsDistribution> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.tts)
        .filter(|v| v.is_finite())
        .collect();
    let q1 = quantile(&values, 0.25)?;
    let q3 = quantile(&values, 0.75)?;
    Some(TtsDistribution { values, q1, q3 })
}

/// Topic x model cross-tabulation of the solved rate. `cells[i][j]` is the
/// mean solved share for `topics[i]` x `models[j]`, scaled to 0-100 in
/// percentage fit-scale mode; cells with no matching rows are `None`
/// (rendered as gaps, never as zero).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Heatmap {
    pub models: Vec<String>,
    pub topics: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

pub fn heatmap(records: &[&NormalizedRecord], fit_scale: FitScale) -> Heatmap {
    let mut models: Vec<String> = records.iter().map(|r| r.model.clone()).collect();
    models.sort();
    models.dedup();
    let mut topics: Vec<String> = records.iter().map(|r| r.topic.clone()).collect();
    topics.sort();
    topics.dedup();
    if models.is_empty() || topics.is_empty() {
        return Heatmap::default();
    }

    let mut counts: BTreeMap<(&str, &str), (u64, u64)> = BTreeMap::new();
    for rec in records {
        let slot = counts
            .entry((rec.topic.as_str(), rec.model.as_str()))
            .or_insert((0, 0));
        slot.0 += 1;
        if rec.is_solved {
            slot.1 += 1;
        }
    }

    let cells = topics
        .iter()
        .map(|t| {
            models
                .iter()
                .map(|m| {
                    counts.get(&(t.as_str(), m.as_str())).map(|&(n, k)| {
                        let mean = k as f64 / n as f64;
                        if fit_scale.is_percent() {
                            mean * 100.0
                        } else {
                            mean
                        }
                    })
                })
                .collect()
        })
        .collect();

    Heatmap {
        models,
        topics,
        cells,
    }
}

/// Headline numbers for the filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub total: u64,
    pub median_tts: Option<f64>,
    /// Fraction of records marked solved; 0 on an empty view.
    pub solved_rate: f64,
    /// Mean fit normalized to the 0-1 scale.
    pub mean_fit01: Option<f64>,
}

pub fn kpi(records: &[&NormalizedRecord], fit_scale: FitScale) -> Kpi {
    let total = records.len() as u64;
    let tts: Vec<f64> = records.iter().filter_map(|r| r.tts).collect();
    let solved = records.iter().filter(|r| r.is_solved).count();
    let solved_rate = if total > 0 {
        solved as f64 / total as f64
    } else {
        0.0
    };
    let fit01: Vec<f64> = records
        .iter()
        .filter_map(|r| r.fit)
        .map(|f| if fit_scale.is_percent() { f / 100.0 } else { f })
        .collect();
    let mean_fit01 = if fit01.is_empty() {
        None
    } else {
        Some(fit01.iter().sum::<f64>() / fit01.len() as f64)
    };
    Kpi {
        total,
        median_tts: median(&tts),
        solved_rate,
        mean_fit01,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_date;

    fn rec(date: &str, model: &str, topic: &str, tts: Option<f64>, solved: bool) -> NormalizedRecord {
        NormalizedRecord {
            date: parse_date(date).unwrap(),
            model: model.to_string(),
            topic: topic.to_string(),
            user_text: String::new(),
            tts,
            is_solved: solved,
            fit: None,
        }
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN]), None);
    }

    #[test]
    fn test_quartiles_linear_interpolation() {
        let vals: Vec<f64> = (1..=8).map(f64::from).collect();
        assert_eq!(quantile(&vals, 0.25), Some(2.75));
        assert_eq!(quantile(&vals, 0.75), Some(6.25));
    }

    #[test]
    fn test_quantile_extremes_and_single_value() {
        let vals = [5.0, 1.0, 3.0];
        assert_eq!(quantile(&vals, 0.0), Some(1.0));
        assert_eq!(quantile(&vals, 1.0), Some(5.0));
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
    }

    #[test]
    fn test_trend_groups_by_day_ascending() {
        let records = vec![
            rec("2024-03-05 10:00:00", "m", "t", Some(2.0), true),
            rec("2024-03-01", "m", "t", Some(4.0), false),
            rec("2024-03-05 16:00:00", "m", "t", Some(6.0), true),
        ];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let points = trend(&refs);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].day, "2024-03-01");
        assert_eq!(points[0].volume, 1);
        assert_eq!(points[0].median_tts, Some(4.0));
        assert_eq!(points[1].day, "2024-03-05");
        assert_eq!(points[1].volume, 2);
        assert_eq!(points[1].median_tts, Some(4.0));
    }

    #[test]
    fn test_trend_day_without_tts() {
        let records = vec![rec("2024-03-01", "m", "t", None, false)];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let points = trend(&refs);
        assert_eq!(points[0].volume, 1);
        assert_eq!(points[0].median_tts, None);
    }

    #[test]
    fn test_trend_empty() {
        assert!(trend(&[]).is_empty());
    }

    #[test]
    fn test_tts_distribution() {
        let records: Vec<NormalizedRecord> = (1..=8)
            .map(|i| rec("2024-03-01", "m", "t", Some(f64::from(i)), false))
            .collect();
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let dist = tts_distribution(&refs).unwrap();
        assert_eq!(dist.values.len(), 8);
        assert_eq!(dist.q1, 2.75);
        assert_eq!(dist.q3, 6.25);
    }

    #[test]
    fn test_tts_distribution_empty_when_no_tts() {
        let records = vec![rec("2024-03-01", "m", "t", None, false)];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        assert!(tts_distribution(&refs).is_none());
        assert!(tts_distribution(&[]).is_none());
    }

    #[test]
    fn test_heatmap_cells_and_gaps() {
        let records = vec![
            rec("2024-03-01", "m1", "auth", None, true),
            rec("2024-03-01", "m1", "auth", None, false),
            rec("2024-03-01", "m2", "billing", None, true),
        ];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let hm = heatmap(&refs, FitScale::ZeroOne);
        assert_eq!(hm.models, vec!["m1", "m2"]);
        assert_eq!(hm.topics, vec!["auth", "billing"]);
        // auth x m1 = 0.5; auth x m2 has no rows
        assert_eq!(hm.cells[0][0], Some(0.5));
        assert_eq!(hm.cells[0][1], None);
        assert_eq!(hm.cells[1][1], Some(1.0));
    }

    #[test]
    fn test_heatmap_percent_scaling() {
        let records = vec![rec("2024-03-01", "m", "t", None, true)];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let hm = heatmap(&refs, FitScale::ZeroHundred);
        assert_eq!(hm.cells[0][0], Some(100.0));
    }

    #[test]
    fn test_heatmap_empty() {
        let hm = heatmap(&[], FitScale::ZeroHundred);
        assert!(hm.models.is_empty());
        assert!(hm.cells.is_empty());
    }

    #[test]
    fn test_kpi_summary() {
        let mut records = vec![
            rec("2024-03-01", "m", "t", Some(2.0), true),
            rec("2024-03-02", "m", "t", Some(4.0), false),
        ];
        records[0].fit = Some(80.0);
        records[1].fit = Some(60.0);
        let refs: Vec<&NormalizedRecord> = records.iter().collect();
        let k = kpi(&refs, FitScale::ZeroHundred);
        assert_eq!(k.total, 2);
        assert_eq!(k.median_tts, Some(3.0));
        assert_eq!(k.solved_rate, 0.5);
        assert!((k.mean_fit01.unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_kpi_empty_view() {
        let k = kpi(&[], FitScale::ZeroHundred);
        assert_eq!(k.total, 0);
        assert_eq!(k.median_tts, None);
        assert_eq!(k.solved_rate, 0.0);
        assert_eq!(k.mean_fit01, None);
    }
}
