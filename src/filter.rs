//! Record filtering by date range, model set, and topic set

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::normalize::Normalizer;
use crate::record::NormalizedRecord;
use crate::store::DatasetStore;

/// Transient, non-owning view over the store produced by a filter pass.
pub type FilteredView<'a> = Vec<&'a NormalizedRecord>;

/// Pure predicate over normalized records. Empty model/topic sets mean
/// "all"; absent date bounds leave that side open.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub date_start: Option<NaiveDate>,
    /// Inclusive through the end of the named day.
    pub date_end: Option<NaiveDate>,
    pub models: HashSet<String>,
    pub topics: HashSet<String>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        let day = record.date.date();
        let in_date = self.date_start.map_or(true, |d0| day >= d0)
            && self.date_end.map_or(true, |d1| day <= d1);
        let in_model = self.models.is_empty() || self.models.contains(&record.model);
        let in_topic = self.topics.is_empty() || self.topics.contains(&record.topic);
        in_date && in_model && in_topic
    }
}

/// Re-derive the filtered view: a full re-normalization pass over the
/// store (so a changed heuristic toggle takes effect), then the predicate.
/// The result entirely replaces any previous view.
pub fn apply_filters<'a>(
    store: &'a mut DatasetStore,
    normalizer: &Normalizer,
    criteria: &FilterCriteria,
) -> FilteredView<'a> {
    store.renormalize(normalizer);
    let view: FilteredView<'a> = store
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .collect();
    debug!(total = store.len(), filtered = view.len(), "filter applied");
    view
}
