//! Row normalization with heuristic inference of missing fields
//!
//! Converts one [`RawRecord`] into an analysis-ready [`NormalizedRecord`].
//! When heuristics are enabled, missing turn counts are estimated from the
//! conversation shape or the user text, and the solved flag is inferred
//! from language signals and the fit score. No parse failure ever
//! propagates: every bad field degrades to `None`/`false`.

use anyhow::Result;
use regex::Regex;

use crate::record::{
    parse_date, parse_json_list, parse_number, parse_plain_number, NormalizedRecord, RawRecord,
};

/// Positive-sentiment markers, English and Indonesian.
const OK_PATTERN: &str =
    r"(?i)\b(thanks|terima\s?kasih?|fixed|solved|works|berhasil|mantap|sip|oke|ok)\b";

/// Turn-count estimate from free text: short exchanges resolve in two
/// turns, medium in three, long in four.
const SHORT_TEXT_TOKENS: usize = 25;
const LONG_TEXT_TOKENS: usize = 100;

/// Fit score at or above which a row counts as solved (0-100 scale).
const SOLVED_FIT_CUTOFF: f64 = 50.0;

/// Stateless row normalizer holding the compiled patterns and the
/// heuristic toggle. Normalization is a pure function of the raw row, so
/// re-running it after a toggle change fully re-derives the dataset.
#[derive(Debug)]
pub struct Normalizer {
    use_heuristics: bool,
    ok_pattern: Regex,
    token_pattern: Regex,
}

impl Normalizer {
    pub fn new(use_heuristics: bool) -> Result<Self> {
        Ok(Self {
            use_heuristics,
            ok_pattern: Regex::new(OK_PATTERN)?,
            token_pattern: Regex::new(r"\w+")?,
        })
    }

    pub fn use_heuristics(&self) -> bool {
        self.use_heuristics
    }

    /// Estimate the number of conversational turns. Sources are tried in
    /// priority order; the first usable one wins:
    /// 1. explicit `turn` column (>= 1)
    /// 2. `conversation` as a non-empty JSON list (its length)
    /// 3. explicit `tts` column (>= 1)
    /// 4. `user_text` as a JSON list of length L: clamp(2L, 2, 10)
    /// 5. `user_text` token count as a proxy
    pub fn estimate_turns(&self, row: &RawRecord) -> Option<f64> {
        if let Some(turn) = row.turn.as_deref().and_then(parse_number) {
            if turn >= 1.0 {
                return Some(turn);
            }
        }

        if let Some(conv) = row.conversation.as_deref().and_then(parse_json_list) {
            if !conv.is_empty() {
                return Some(conv.len() as f64);
            }
        }

        if let Some(tts) = row.tts.as_deref().and_then(parse_number) {
            if tts >= 1.0 {
                return Some(tts);
            }
        }

        if let Some(text) = row.user_text.as_deref() {
            if let Some(list) = parse_json_list(text) {
                let turns = (2 * list.len()).clamp(2, 10);
                return Some(turns as f64);
            }
            let tokens = self.token_pattern.find_iter(text).count();
            return Some(if tokens <= SHORT_TEXT_TOKENS {
                2.0
            } else if tokens <= LONG_TEXT_TOKENS {
                3.0
            } else {
                4.0
            });
        }

        None
    }

    /// Infer the solved flag. An explicit numeric value always wins, even
    /// an explicit zero alongside positive language in the text.
    pub fn infer_solved(&self, row: &RawRecord) -> bool {
        if let Some(n) = row.is_solved.as_deref().and_then(parse_plain_number) {
            return n != 0.0;
        }

        if let Some(text) = row.user_text.as_deref() {
            if self.ok_pattern.is_match(text) {
                return true;
            }
        }

        if let Some(fit) = row.fit.as_deref().and_then(parse_number) {
            return fit >= SOLVED_FIT_CUTOFF;
        }

        false
    }

    /// Normalize one raw row. Returns `None` for rows that may not enter
    /// the dataset store: unparseable date, or empty model/topic.
    pub fn normalize(&self, row: &RawRecord) -> Option<NormalizedRecord> {
        let date = row.date.as_deref().and_then(parse_date)?;

        let model = row.model.as_deref().unwrap_or("").trim().to_string();
        let topic = row.topic.as_deref().unwrap_or("").trim().to_string();
        if model.is_empty() || topic.is_empty() {
            return None;
        }

        let user_text = row.user_text.clone().unwrap_or_default();
        let fit = row.fit.as_deref().and_then(parse_number);

        let (tts, is_solved) = if self.use_heuristics {
            (self.estimate_turns(row), self.infer_solved(row))
        } else {
            let tts = row.tts.as_deref().and_then(parse_number);
            let is_solved = row
                .is_solved
                .as_deref()
                .and_then(parse_plain_number)
                .map(|n| n != 0.0)
                .unwrap_or(false);
            (tts, is_solved)
        };

        Some(NormalizedRecord {
            date,
            model,
            topic,
            user_text,
            tts,
            is_solved,
            fit,
        })
    }
}
