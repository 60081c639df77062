//! Popular query tracking
//!
//! Every issued query bumps a counter in the ranked set `hot:{scope}`,
//! whether or not it returned anything. Counts only ever grow.

use crate::tokenizer::normalize_query;
use std::sync::Arc;
use tracing::debug;
use typeahead_core::{Deadline, KeySpace, Result, Store};

/// Query popularity counter
#[derive(Clone)]
pub struct HotQueryTracker {
    store: Arc<dyn Store>,
    keys: KeySpace,
}

impl HotQueryTracker {
    /// Create a tracker over `store` for the scope of `keys`
    pub fn new(store: Arc<dyn Store>, keys: KeySpace) -> Self {
        HotQueryTracker { store, keys }
    }

    /// Count one issue of `query`
    ///
    /// The query is normalized first; a blank query is not counted and
    /// yields 0. Returns the new count.
    pub fn record(&self, query: &str, deadline: &Deadline) -> Result<u64> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Ok(0);
        }
        deadline.check("ranked_increment")?;
        let count = self.store.ranked_increment(self.keys.hot(), &query, 1.0)?;
        debug!(target: "typeahead::hot", query = %query, count, "Query recorded");
        Ok(count as u64)
    }

    /// The `limit` most issued queries, most popular first
    pub fn top_queries(&self, limit: usize, deadline: &Deadline) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        deadline.check("ranked_range_desc")?;
        self.store.ranked_range_desc(self.keys.hot(), 0, limit)
    }

    /// Like [`HotQueryTracker::top_queries`], with counts
    pub fn top_queries_with_counts(&self, limit: usize, deadline: &Deadline) -> Result<Vec<(String, u64)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        deadline.check("ranked_range_desc_with_scores")?;
        Ok(self
            .store
            .ranked_range_desc_with_scores(self.keys.hot(), 0, limit)?
            .into_iter()
            .map(|(q, score)| (q, score as u64))
            .collect())
    }

    /// Times `query` was issued
    pub fn count(&self, query: &str, deadline: &Deadline) -> Result<u64> {
        deadline.check("ranked_score")?;
        Ok(self
            .store
            .ranked_score(self.keys.hot(), &normalize_query(query))?
            .map(|s| s as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeahead_storage::MemoryStore;

    fn tracker() -> HotQueryTracker {
        HotQueryTracker::new(Arc::new(MemoryStore::new()), KeySpace::new("t"))
    }

    #[test]
    fn test_record_increments() {
        let hot = tracker();
        let d = Deadline::none();
        assert_eq!(hot.record("cat", &d).unwrap(), 1);
        assert_eq!(hot.record("cat", &d).unwrap(), 2);
        assert_eq!(hot.count("cat", &d).unwrap(), 2);
        assert_eq!(hot.count("dog", &d).unwrap(), 0);
    }

    #[test]
    fn test_record_normalizes() {
        let hot = tracker();
        let d = Deadline::none();
        hot.record("Cat", &d).unwrap();
        hot.record(" CAT ", &d).unwrap();
        assert_eq!(hot.count("cat", &d).unwrap(), 2);
    }

    #[test]
    fn test_blank_not_recorded() {
        let hot = tracker();
        let d = Deadline::none();
        assert_eq!(hot.record("   ", &d).unwrap(), 0);
        assert!(hot.top_queries(10, &d).unwrap().is_empty());
    }

    #[test]
    fn test_top_queries_order() {
        let hot = tracker();
        let d = Deadline::none();
        for _ in 0..3 {
            hot.record("cat", &d).unwrap();
        }
        hot.record("dog", &d).unwrap();
        for _ in 0..2 {
            hot.record("bird", &d).unwrap();
        }

        assert_eq!(hot.top_queries(1, &d).unwrap(), vec!["cat"]);
        assert_eq!(hot.top_queries(10, &d).unwrap(), vec!["cat", "bird", "dog"]);
        assert_eq!(
            hot.top_queries_with_counts(2, &d).unwrap(),
            vec![("cat".to_string(), 3), ("bird".to_string(), 2)]
        );
        assert!(hot.top_queries(0, &d).unwrap().is_empty());
    }
}
