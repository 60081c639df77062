//! Composite query results
//!
//! A fuzzy query over several tokens is answered from derived ranked sets:
//! the intersection and the union of the tokens' prefix sets. Where those
//! derived sets live, and for how long, is decided by one policy for both
//! kinds:
//!
//! - **Ephemeral** (default): computed for every query under a key unique to
//!   the call, read, then deleted. Never stale. Concurrent identical queries
//!   use distinct keys, so one cannot delete a set another is still reading.
//! - **Persistent**: computed once under a key derived from the token
//!   combination and reused until invalidated. Cheap reads, but a later
//!   add or delete under one of the tokens is not reflected. Concurrent first
//!   queries may both compute the set; they write the same result.
//!
//! Persisted keys are recorded in `cache:{scope}` so [`CompositeQueryCache::invalidate_all`]
//! can drop them.

use crate::prefix_index::PrefixIndex;
use std::sync::Arc;
use tracing::{debug, info};
use typeahead_core::{CompositeKind, Deadline, Error, KeySpace, Result, Store};
use uuid::Uuid;

/// Lifetime of derived composite sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositePolicy {
    /// Recompute per query, delete after reading
    #[default]
    Ephemeral,
    /// Compute once, keep until invalidated
    Persistent,
}

impl CompositePolicy {
    /// Parse a policy name (`"ephemeral"` or `"persistent"`)
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "ephemeral" => Ok(CompositePolicy::Ephemeral),
            "persistent" => Ok(CompositePolicy::Persistent),
            other => Err(Error::InvalidConfig(format!(
                "Invalid composite policy '{}'. Expected \"ephemeral\" or \"persistent\".",
                other
            ))),
        }
    }

    /// Policy name as written in config
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositePolicy::Ephemeral => "ephemeral",
            CompositePolicy::Persistent => "persistent",
        }
    }
}

/// Builds, serves and invalidates composite sets
#[derive(Clone)]
pub struct CompositeQueryCache {
    store: Arc<dyn Store>,
    keys: KeySpace,
    index: PrefixIndex,
    policy: CompositePolicy,
}

impl CompositeQueryCache {
    /// Create a cache over `index` with the given policy
    pub fn new(
        store: Arc<dyn Store>,
        keys: KeySpace,
        index: PrefixIndex,
        policy: CompositePolicy,
    ) -> Self {
        CompositeQueryCache {
            store,
            keys,
            index,
            policy,
        }
    }

    /// Active policy
    pub fn policy(&self) -> CompositePolicy {
        self.policy
    }

    /// Top `limit` ids present under every token
    pub fn intersect(&self, tokens: &[String], limit: usize, deadline: &Deadline) -> Result<Vec<String>> {
        self.resolve(CompositeKind::Intersection, tokens, limit, deadline)
    }

    /// Top `limit` ids present under any token
    pub fn union(&self, tokens: &[String], limit: usize, deadline: &Deadline) -> Result<Vec<String>> {
        self.resolve(CompositeKind::Union, tokens, limit, deadline)
    }

    /// Top `limit` ids of the composite of `kind` over `tokens`
    ///
    /// Token order and repetition do not matter.
    pub fn resolve(
        &self,
        kind: CompositeKind,
        tokens: &[String],
        limit: usize,
        deadline: &Deadline,
    ) -> Result<Vec<String>> {
        let tokens = canonical_tokens(tokens);
        if tokens.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let key = self.keys.composite(kind, &tokens);

        match self.policy {
            CompositePolicy::Persistent => {
                deadline.check("exists")?;
                if !self.store.exists(&key)? {
                    let len = self.build(kind, &tokens, &key, deadline)?;
                    if len > 0 {
                        deadline.check("set_add")?;
                        self.store.set_add(self.keys.composite_registry(), &key)?;
                    }
                    debug!(target: "typeahead::cache", key = %key, len, "Composite built");
                }
                self.read(&key, limit, deadline)
            }
            CompositePolicy::Ephemeral => {
                let key = format!("{}:{}", key, Uuid::new_v4().simple());
                let outcome = self
                    .build(kind, &tokens, &key, deadline)
                    .and_then(|_| self.read(&key, limit, deadline));
                // Cleanup is issued even past the deadline so no per-call key is left behind
                let cleanup = self.store.delete(&key);
                let ids = outcome?;
                cleanup?;
                Ok(ids)
            }
        }
    }

    /// Delete every persisted composite set
    ///
    /// Returns how many were dropped. A no-op under the ephemeral policy,
    /// which never persists anything.
    pub fn invalidate_all(&self, deadline: &Deadline) -> Result<usize> {
        deadline.check("set_members")?;
        let keys = self.store.set_members(self.keys.composite_registry())?;
        let mut dropped = 0;
        for key in &keys {
            deadline.check("delete")?;
            if self.store.delete(key)? {
                dropped += 1;
            }
        }
        deadline.check("delete")?;
        self.store.delete(self.keys.composite_registry())?;
        if !keys.is_empty() {
            info!(target: "typeahead::cache", scope = self.keys.scope(), dropped, "Composites invalidated");
        }
        Ok(dropped)
    }

    fn build(&self, kind: CompositeKind, tokens: &[String], dest: &str, deadline: &Deadline) -> Result<usize> {
        match kind {
            CompositeKind::Intersection => self.index.intersect(tokens, dest, deadline),
            CompositeKind::Union => self.index.union(tokens, dest, deadline),
        }
    }

    fn read(&self, key: &str, limit: usize, deadline: &Deadline) -> Result<Vec<String>> {
        deadline.check("ranked_range_desc")?;
        self.store.ranked_range_desc(key, 0, limit)
    }
}

/// Sorted, deduplicated, non-blank tokens
fn canonical_tokens(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tokens
        .iter()
        .filter(|t| !t.trim().is_empty())
        .cloned()
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeahead_storage::testing::InstrumentedStore;
    use typeahead_storage::MemoryStore;

    fn tokens(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn setup(policy: CompositePolicy) -> (Arc<InstrumentedStore<MemoryStore>>, PrefixIndex, CompositeQueryCache) {
        let store = Arc::new(InstrumentedStore::new(MemoryStore::new()));
        let keys = KeySpace::new("t");
        let index = PrefixIndex::new(store.clone(), keys.clone());
        let cache = CompositeQueryCache::new(store.clone(), keys, index.clone(), policy);

        let d = Deadline::none();
        index.index_prefix("new", "nyc", 3.0, &d).unwrap();
        index.index_prefix("city", "nyc", 3.0, &d).unwrap();
        index.index_prefix("new", "newark", 1.0, &d).unwrap();
        index.index_prefix("city", "mexico", 2.0, &d).unwrap();
        (store, index, cache)
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(CompositePolicy::parse("ephemeral").unwrap(), CompositePolicy::Ephemeral);
        assert_eq!(CompositePolicy::parse("persistent").unwrap(), CompositePolicy::Persistent);
        assert!(matches!(
            CompositePolicy::parse("forever"),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(CompositePolicy::default().as_str(), "ephemeral");
    }

    #[test]
    fn test_ephemeral_leaves_no_keys() {
        let (store, _, cache) = setup(CompositePolicy::Ephemeral);
        let d = Deadline::none();
        let before = store.inner().keys();

        let inter = cache.intersect(&tokens(&["new", "city"]), 5, &d).unwrap();
        assert_eq!(inter, vec!["nyc"]);
        let union = cache.union(&tokens(&["new", "city"]), 5, &d).unwrap();
        assert_eq!(union, vec!["nyc", "mexico", "newark"]);

        assert_eq!(store.inner().keys(), before);
    }

    #[test]
    fn test_ephemeral_sees_fresh_data() {
        let (_, index, cache) = setup(CompositePolicy::Ephemeral);
        let d = Deadline::none();
        let t = tokens(&["new", "city"]);
        assert_eq!(cache.intersect(&t, 5, &d).unwrap(), vec!["nyc"]);

        index.index_prefix("new", "mexico", 1.0, &d).unwrap();
        assert_eq!(cache.intersect(&t, 5, &d).unwrap(), vec!["nyc", "mexico"]);
    }

    #[test]
    fn test_persistent_reuses_and_goes_stale() {
        let (store, index, cache) = setup(CompositePolicy::Persistent);
        let d = Deadline::none();
        let t = tokens(&["new", "city"]);

        assert_eq!(cache.intersect(&t, 5, &d).unwrap(), vec!["nyc"]);
        assert_eq!(store.calls("ranked_intersect_into"), 1);
        assert!(store.inner().exists("cache:t:and:city|new").unwrap());

        // A new member under both tokens is not visible to the cached set
        index.index_prefix("new", "mexico", 1.0, &d).unwrap();
        assert_eq!(cache.intersect(&t, 5, &d).unwrap(), vec!["nyc"]);
        assert_eq!(store.calls("ranked_intersect_into"), 1);

        // Until invalidated
        assert_eq!(cache.invalidate_all(&d).unwrap(), 1);
        assert_eq!(cache.intersect(&t, 5, &d).unwrap(), vec!["nyc", "mexico"]);
        assert_eq!(store.calls("ranked_intersect_into"), 2);
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let (store, _, cache) = setup(CompositePolicy::Persistent);
        let d = Deadline::none();
        cache.union(&tokens(&["new", "city"]), 5, &d).unwrap();
        cache.union(&tokens(&["city", "new", "city"]), 5, &d).unwrap();
        assert_eq!(store.calls("ranked_union_into"), 1);
    }

    #[test]
    fn test_limit_truncates() {
        let (_, _, cache) = setup(CompositePolicy::Ephemeral);
        let d = Deadline::none();
        let union = cache.union(&tokens(&["new", "city"]), 2, &d).unwrap();
        assert_eq!(union, vec!["nyc", "mexico"]);
        assert!(cache.union(&tokens(&["new"]), 0, &d).unwrap().is_empty());
        assert!(cache.union(&[], 5, &d).unwrap().is_empty());
    }

    #[test]
    fn test_ephemeral_cleans_up_on_read_failure() {
        let (store, _, cache) = setup(CompositePolicy::Ephemeral);
        let before = store.inner().keys();
        store.fail_on("ranked_range_desc");

        let err = cache
            .intersect(&tokens(&["new", "city"]), 5, &Deadline::none())
            .unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert_eq!(store.inner().keys(), before);
    }

    #[test]
    fn test_invalidate_is_noop_for_ephemeral() {
        let (_, _, cache) = setup(CompositePolicy::Ephemeral);
        let d = Deadline::none();
        cache.intersect(&tokens(&["new", "city"]), 5, &d).unwrap();
        assert_eq!(cache.invalidate_all(&d).unwrap(), 0);
    }
}
