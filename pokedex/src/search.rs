//! Live text search over a catalog view.
//!
//! An entry matches a non-blank query when any of these hold:
//! - its name contains the lower-cased query,
//! - one of its type names contains the lower-cased query (only when the
//!   entry's detail is already resolved; otherwise this rule never matches),
//! - its numeric id printed in decimal equals the trimmed query.
//!
//! Lower-casing leaves ASCII digits untouched, so the id rule behaves the
//! same whether it is checked before or after lower-casing: `"4"` matches id
//! 4, `"04"` does not.

use std::collections::HashMap;

use tui_dispatch::DataResource;

use crate::model::{EntityDetail, EntitySummary};

/// Resolved details available at filter time.
pub trait DetailLookup {
    fn detail(&self, name: &str) -> Option<&EntityDetail>;
}

/// No details known; type matching never fires.
impl DetailLookup for () {
    fn detail(&self, _name: &str) -> Option<&EntityDetail> {
        None
    }
}

impl DetailLookup for HashMap<String, EntityDetail> {
    fn detail(&self, name: &str) -> Option<&EntityDetail> {
        self.get(name)
    }
}

impl DetailLookup for HashMap<String, DataResource<EntityDetail>> {
    fn detail(&self, name: &str) -> Option<&EntityDetail> {
        self.get(name).and_then(DataResource::data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    trimmed: String,
    lowered: String,
}

impl SearchQuery {
    /// `None` for empty or whitespace-only input.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            trimmed: trimmed.to_string(),
            lowered: trimmed.to_lowercase(),
        })
    }

    pub fn matches(&self, summary: &EntitySummary, detail: Option<&EntityDetail>) -> bool {
        if summary.name.to_lowercase().contains(&self.lowered) {
            return true;
        }
        if let Some(detail) = detail {
            if detail
                .type_names()
                .any(|name| name.to_lowercase().contains(&self.lowered))
            {
                return true;
            }
        }
        let id = detail.map(|detail| detail.id).or_else(|| summary.id_from_url());
        id.is_some_and(|id| id.to_string() == self.trimmed)
    }
}

/// Positions in `base` that match `query`, in base order. A blank query
/// selects every position.
pub fn filter_indices(base: &[EntitySummary], query: &str, details: &impl DetailLookup) -> Vec<usize> {
    let Some(query) = SearchQuery::parse(query) else {
        return (0..base.len()).collect();
    };
    base.iter()
        .enumerate()
        .filter(|(_, summary)| query.matches(summary, details.detail(&summary.name)))
        .map(|(idx, _)| idx)
        .collect()
}

/// Filtered view of `base`. A blank query returns `base` unchanged.
pub fn filter(base: &[EntitySummary], query: &str, details: &impl DetailLookup) -> Vec<EntitySummary> {
    if SearchQuery::parse(query).is_none() {
        return base.to_vec();
    }
    filter_indices(base, query, details)
        .into_iter()
        .map(|idx| base[idx].clone())
        .collect()
}
