//! Case-insensitive substring filter over a record collection.
//!
//! A record matches when the lower-cased query occurs in its title, in the
//! string form of its date, or (only when `include_author` is set) in its
//! author. Missing fields compare as empty strings. Matches keep the order
//! of the input collection.
//!
//! An empty or absent query returns no records rather than the whole
//! collection; the controller signals "no search" separately.

use std::sync::Arc;

use crate::models::Record;

/// Stateless filter; see the module docs for the matching rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFilter;

impl RecordFilter {
    /// Return the records matching `query`, in collection order.
    ///
    /// The returned handles share the records' allocations; the collection
    /// itself is neither copied nor modified.
    pub fn apply(records: &[Arc<Record>], query: Option<&str>, include_author: bool) -> Vec<Arc<Record>> {
        let query = match query {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return Vec::new(),
        };

        records
            .iter()
            .filter(|r| Self::matches(r, &query, include_author))
            .cloned()
            .collect()
    }

    /// Test one record against an already lower-cased query.
    pub fn matches(record: &Record, lowered_query: &str, include_author: bool) -> bool {
        if record.title_or_empty().to_lowercase().contains(lowered_query) {
            return true;
        }

        let date_text = record
            .date
            .as_ref()
            .map(|d| d.as_search_text())
            .unwrap_or_default();
        if date_text.to_lowercase().contains(lowered_query) {
            return true;
        }

        include_author && record.author_or_empty().to_lowercase().contains(lowered_query)
    }
}
