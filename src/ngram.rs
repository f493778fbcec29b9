//! Unigram/bigram frequency tables over user text
//!
//! When no precomputed term-frequency table was supplied, one is derived
//! from the filtered records: lowercase, tokenize on letter/number/
//! apostrophe runs, drop common function words, and count unigrams and
//! adjacent bigrams together in a single frequency map.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use regex::Regex;
use serde::Serialize;

use crate::record::{parse_number, NormalizedRecord};

/// Mixed English/Indonesian function words excluded from counting.
const STOPWORDS: [&str; 15] = [
    "the", "and", "to", "of", "a", "in", "for", "on", "is", "are", "itu", "yang", "dan", "di",
    "ke",
];

/// How many terms a frequency table keeps.
pub const TOP_TERMS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermFrequency {
    pub term: String,
    pub freq: f64,
}

/// One row of the optional external n-gram table, still in text form.
#[derive(Debug, Clone, Default)]
pub struct ExternalTermRow {
    pub term: Option<String>,
    pub freq: Option<String>,
}

/// Counter holding the compiled token pattern and stopword set.
#[derive(Debug)]
pub struct NgramCounter {
    token_pattern: Regex,
    stopwords: HashSet<&'static str>,
}

impl NgramCounter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            token_pattern: Regex::new(r"[\p{L}\p{N}']+")?,
            stopwords: STOPWORDS.into_iter().collect(),
        })
    }

    /// Count unigrams and adjacent bigrams over the user text of the view,
    /// keeping the top [`TOP_TERMS`] by descending frequency. Ties keep
    /// first-encountered order (the sort is stable).
    pub fn count(&self, records: &[&NormalizedRecord]) -> Vec<TermFrequency> {
        let mut order: Vec<(String, u64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut bump = |term: String, order: &mut Vec<(String, u64)>| {
            if let Some(&i) = index.get(&term) {
                order[i].1 += 1;
            } else {
                index.insert(term.clone(), order.len());
                order.push((term, 1));
            }
        };

        for rec in records {
            let text = rec.user_text.to_lowercase();
            let tokens: Vec<&str> = self
                .token_pattern
                .find_iter(&text)
                .map(|m| m.as_str())
                .filter(|t| !self.stopwords.contains(t))
                .collect();
            for t in &tokens {
                bump((*t).to_string(), &mut order);
            }
            for pair in tokens.windows(2) {
                bump(format!("{} {}", pair[0], pair[1]), &mut order);
            }
        }

        order.sort_by(|a, b| b.1.cmp(&a.1));
        order
            .into_iter()
            .take(TOP_TERMS)
            .map(|(term, freq)| TermFrequency {
                term,
                freq: freq as f64,
            })
            .collect()
    }
}

/// Use a supplied term-frequency table instead of deriving one: parse
/// frequencies, drop unparseable rows, sort descending, keep the top 30.
pub fn from_external(rows: &[ExternalTermRow]) -> Vec<TermFrequency> {
    let mut terms: Vec<TermFrequency> = rows
        .iter()
        .filter_map(|row| {
            let term = row.term.clone()?;
            if term.is_empty() {
                return None;
            }
            let freq = row.freq.as_deref().and_then(parse_number).unwrap_or(0.0);
            Some(TermFrequency { term, freq })
        })
        .collect();
    terms.sort_by(|a, b| b.freq.partial_cmp(&a.freq).unwrap_or(std::cmp::Ordering::Equal));
    terms.truncate(TOP_TERMS);
    terms
}
