//! In-memory dataset store with derived indices
//!
//! The store keeps the raw rows alongside the normalized records so a
//! heuristic-toggle change can replay normalization from the original
//! inputs instead of mutating derived records in place. Indices (distinct
//! models, distinct topics, date bounds) are rebuilt wholesale on every
//! ingest or re-normalization; there is no partial update.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::normalize::Normalizer;
use crate::record::{NormalizedRecord, RawRecord};

#[derive(Debug, Default)]
pub struct DatasetStore {
    raw: Vec<RawRecord>,
    records: Vec<NormalizedRecord>,
    models: BTreeSet<String>,
    topics: BTreeSet<String>,
    date_bounds: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store contents with the given raw rows. Rows that fail
    /// normalization are dropped; an all-invalid input leaves the store
    /// empty, which callers must check before aggregating.
    pub fn ingest(&mut self, rows: Vec<RawRecord>, normalizer: &Normalizer) {
        self.raw = rows;
        self.rebuild(normalizer);
    }

    /// Re-run normalization over the retained raw rows. Called on every
    /// filter application so a changed heuristic toggle takes effect.
    pub fn renormalize(&mut self, normalizer: &Normalizer) {
        self.rebuild(normalizer);
    }

    fn rebuild(&mut self, normalizer: &Normalizer) {
        self.records = self
            .raw
            .iter()
            .filter_map(|row| normalizer.normalize(row))
            .collect();

        self.models = self.records.iter().map(|r| r.model.clone()).collect();
        self.topics = self.records.iter().map(|r| r.topic.clone()).collect();
        self.date_bounds = self.records.iter().map(|r| r.date).fold(None, |acc, d| {
            Some(match acc {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            })
        });

        debug!(
            raw = self.raw.len(),
            valid = self.records.len(),
            models = self.models.len(),
            topics = self.topics.len(),
            "dataset rebuilt"
        );
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Distinct model identifiers, sorted ascending.
    pub fn models(&self) -> &BTreeSet<String> {
        &self.models
    }

    /// Distinct topic identifiers, sorted ascending.
    pub fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }

    /// Min and max record dates, `None` when the store is empty.
    pub fn date_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.date_bounds
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
