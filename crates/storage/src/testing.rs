//! Testing utilities for code running against a [`Store`]
//!
//! `InstrumentedStore` wraps any store, counts every call by operation name,
//! and can be told to fail calls to simulate an unreachable backend:
//!
//! - `fail_after(n)`: the first `n` calls succeed, every later call fails
//! - `fail_on(op)`: every call to the named operation fails
//!
//! Failures surface as `StoreUnavailable`, the same error a real backend
//! adapter reports when its connection drops.
//!
//! # Example
//!
//! ```
//! use typeahead_core::Store;
//! use typeahead_storage::testing::InstrumentedStore;
//! use typeahead_storage::MemoryStore;
//!
//! let store = InstrumentedStore::new(MemoryStore::new());
//! store.fail_on("ranked_upsert");
//! assert!(store.ranked_upsert("k", "m", 1.0).is_err());
//! assert!(store.set_add("s", "m").is_ok());
//! assert_eq!(store.calls("ranked_upsert"), 1);
//! ```

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use typeahead_core::{Error, Result, Store};

#[derive(Debug, Default)]
struct Faults {
    fail_after: Option<usize>,
    fail_ops: FxHashSet<&'static str>,
}

/// Store wrapper that records calls and injects failures
#[derive(Debug)]
pub struct InstrumentedStore<S> {
    inner: S,
    calls: Mutex<FxHashMap<&'static str, usize>>,
    total: Mutex<usize>,
    faults: Mutex<Faults>,
}

impl<S: Store> InstrumentedStore<S> {
    /// Wrap `inner`; no faults configured
    pub fn new(inner: S) -> Self {
        InstrumentedStore {
            inner,
            calls: Mutex::new(FxHashMap::default()),
            total: Mutex::new(0),
            faults: Mutex::new(Faults::default()),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Let `n` more calls succeed, then fail every call
    pub fn fail_after(&self, n: usize) {
        let total = *self.total.lock();
        self.faults.lock().fail_after = Some(total + n);
    }

    /// Fail every call to operation `op`
    pub fn fail_on(&self, op: &'static str) {
        self.faults.lock().fail_ops.insert(op);
    }

    /// Remove all configured faults
    pub fn heal(&self) {
        *self.faults.lock() = Faults::default();
    }

    /// Calls made to operation `op`, including failed ones
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    /// Calls made to any operation
    pub fn total_calls(&self) -> usize {
        *self.total.lock()
    }

    /// Reset call counters
    pub fn reset_counts(&self) {
        self.calls.lock().clear();
        *self.total.lock() = 0;
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        let seq = {
            let mut total = self.total.lock();
            *total += 1;
            *total
        };
        *self.calls.lock().entry(op).or_insert(0) += 1;

        let faults = self.faults.lock();
        if faults.fail_ops.contains(op) {
            return Err(Error::unavailable(format!("injected failure on {}", op)));
        }
        if matches!(faults.fail_after, Some(limit) if seq > limit) {
            return Err(Error::unavailable(format!(
                "injected failure after {} calls",
                seq - 1
            )));
        }
        Ok(())
    }
}

impl<S: Store> Store for InstrumentedStore<S> {
    fn map_put(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.enter("map_put")?;
        self.inner.map_put(key, field, value)
    }

    fn map_get_many(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>> {
        self.enter("map_get_many")?;
        self.inner.map_get_many(key, fields)
    }

    fn map_remove(&self, key: &str, field: &str) -> Result<bool> {
        self.enter("map_remove")?;
        self.inner.map_remove(key, field)
    }

    fn map_len(&self, key: &str) -> Result<usize> {
        self.enter("map_len")?;
        self.inner.map_len(key)
    }

    fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        self.enter("set_add")?;
        self.inner.set_add(key, member)
    }

    fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.enter("set_remove")?;
        self.inner.set_remove(key, member)
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.enter("set_members")?;
        self.inner.set_members(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.enter("exists")?;
        self.inner.exists(key)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.enter("delete")?;
        self.inner.delete(key)
    }

    fn ranked_upsert(&self, key: &str, member: &str, score: f64) -> Result<()> {
        self.enter("ranked_upsert")?;
        self.inner.ranked_upsert(key, member, score)
    }

    fn ranked_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.enter("ranked_remove")?;
        self.inner.ranked_remove(key, member)
    }

    fn ranked_cardinality(&self, key: &str) -> Result<usize> {
        self.enter("ranked_cardinality")?;
        self.inner.ranked_cardinality(key)
    }

    fn ranked_range_desc(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>> {
        self.enter("ranked_range_desc")?;
        self.inner.ranked_range_desc(key, offset, limit)
    }

    fn ranked_range_desc_with_scores(
        &self,
        key: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(String, f64)>> {
        self.enter("ranked_range_desc_with_scores")?;
        self.inner.ranked_range_desc_with_scores(key, offset, limit)
    }

    fn ranked_score(&self, key: &str, member: &str) -> Result<Option<f64>> {
        self.enter("ranked_score")?;
        self.inner.ranked_score(key, member)
    }

    fn ranked_increment(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        self.enter("ranked_increment")?;
        self.inner.ranked_increment(key, member, delta)
    }

    fn ranked_intersect_into(&self, dest: &str, sources: &[String]) -> Result<usize> {
        self.enter("ranked_intersect_into")?;
        self.inner.ranked_intersect_into(dest, sources)
    }

    fn ranked_union_into(&self, dest: &str, sources: &[String]) -> Result<usize> {
        self.enter("ranked_union_into")?;
        self.inner.ranked_union_into(dest, sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_counts_calls_per_operation() {
        let store = InstrumentedStore::new(MemoryStore::new());
        store.set_add("s", "a").unwrap();
        store.set_add("s", "b").unwrap();
        store.exists("s").unwrap();

        assert_eq!(store.calls("set_add"), 2);
        assert_eq!(store.calls("exists"), 1);
        assert_eq!(store.calls("delete"), 0);
        assert_eq!(store.total_calls(), 3);

        store.reset_counts();
        assert_eq!(store.total_calls(), 0);
    }

    #[test]
    fn test_fail_after() {
        let store = InstrumentedStore::new(MemoryStore::new());
        store.set_add("s", "a").unwrap();
        store.fail_after(1);

        assert!(store.set_add("s", "b").is_ok());
        let err = store.set_add("s", "c").unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert!(err.is_retryable());

        // The failed call never reached the inner store
        assert_eq!(store.inner().set_members("s").unwrap().len(), 2);
    }

    #[test]
    fn test_heal_clears_faults() {
        let store = InstrumentedStore::new(MemoryStore::new());
        store.fail_on("map_put");
        assert!(store.map_put("m", "f", "v").is_err());
        store.heal();
        assert!(store.map_put("m", "f", "v").is_ok());
    }
}
