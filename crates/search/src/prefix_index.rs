//! Prefix → ranked item ids
//!
//! Each prefix owns a ranked set `index:{scope}:{prefix}` (item id → score),
//! and the registry set `index:{scope}` lists every prefix whose ranked set
//! has members.
//!
//! # Registry consistency
//!
//! A prefix is in the registry iff its ranked set is non-empty. Removal is a
//! sequence of independent store calls (remove member, check emptiness,
//! delete set, deregister), so a concurrent `index_prefix` on the same prefix
//! can interleave with it:
//!
//! - if the indexer's registry add lands before our deregister, the prefix
//!   would be missing from the registry while its set has members. After
//!   deregistering we check the set again and re-register it if it exists.
//! - if the indexer's member write lands between our emptiness check and the
//!   delete, that member is lost. Re-running the `add` restores it; every
//!   write here is an idempotent upsert.

use std::sync::Arc;
use tracing::{debug, warn};
use typeahead_core::{Deadline, KeySpace, Result, Store};

/// Ranked prefix sets plus the prefix registry
#[derive(Clone)]
pub struct PrefixIndex {
    store: Arc<dyn Store>,
    keys: KeySpace,
}

impl PrefixIndex {
    /// Create a prefix index over `store` for the scope of `keys`
    pub fn new(store: Arc<dyn Store>, keys: KeySpace) -> Self {
        PrefixIndex { store, keys }
    }

    /// Store key of the ranked set for `prefix`
    pub fn set_key(&self, prefix: &str) -> String {
        self.keys.prefix(prefix)
    }

    /// Register `prefix` and upsert `id` with `score` into its set
    ///
    /// Re-indexing the same pair overwrites the score.
    pub fn index_prefix(&self, prefix: &str, id: &str, score: f64, deadline: &Deadline) -> Result<()> {
        deadline.check("set_add")?;
        self.store.set_add(self.keys.registry(), prefix)?;
        deadline.check("ranked_upsert")?;
        self.store.ranked_upsert(&self.keys.prefix(prefix), id, score)
    }

    /// Remove `id` from `prefix`, dropping the prefix once its set is empty
    ///
    /// Returns true if the prefix was dropped from the registry.
    pub fn unindex_prefix(&self, prefix: &str, id: &str, deadline: &Deadline) -> Result<bool> {
        let key = self.keys.prefix(prefix);

        deadline.check("ranked_remove")?;
        self.store.ranked_remove(&key, id)?;

        deadline.check("ranked_cardinality")?;
        if self.store.ranked_cardinality(&key)? > 0 {
            return Ok(false);
        }

        deadline.check("delete")?;
        self.store.delete(&key)?;
        deadline.check("set_remove")?;
        self.store.set_remove(self.keys.registry(), prefix)?;

        deadline.check("exists")?;
        if self.store.exists(&key)? {
            warn!(target: "typeahead::index", prefix, "Prefix re-populated during removal, re-registering");
            self.store.set_add(self.keys.registry(), prefix)?;
            return Ok(false);
        }

        debug!(target: "typeahead::index", prefix, "Prefix dropped");
        Ok(true)
    }

    /// Ids under `prefix`, highest score first
    pub fn range_by_score_desc(
        &self,
        prefix: &str,
        offset: usize,
        limit: usize,
        deadline: &Deadline,
    ) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        deadline.check("ranked_range_desc")?;
        self.store
            .ranked_range_desc(&self.keys.prefix(prefix), offset, limit)
    }

    /// Store at `dest` the ids present under every prefix, scores summed
    ///
    /// Returns the size of the result.
    pub fn intersect(&self, prefixes: &[String], dest: &str, deadline: &Deadline) -> Result<usize> {
        let sources = self.source_keys(prefixes);
        deadline.check("ranked_intersect_into")?;
        self.store.ranked_intersect_into(dest, &sources)
    }

    /// Store at `dest` the ids present under any prefix, scores summed
    ///
    /// Returns the size of the result.
    pub fn union(&self, prefixes: &[String], dest: &str, deadline: &Deadline) -> Result<usize> {
        let sources = self.source_keys(prefixes);
        deadline.check("ranked_union_into")?;
        self.store.ranked_union_into(dest, &sources)
    }

    /// Number of ids under `prefix`
    pub fn cardinality(&self, prefix: &str, deadline: &Deadline) -> Result<usize> {
        deadline.check("ranked_cardinality")?;
        self.store.ranked_cardinality(&self.keys.prefix(prefix))
    }

    /// Whether `id` is indexed under `prefix`
    pub fn contains(&self, prefix: &str, id: &str, deadline: &Deadline) -> Result<bool> {
        deadline.check("ranked_score")?;
        Ok(self
            .store
            .ranked_score(&self.keys.prefix(prefix), id)?
            .is_some())
    }

    /// Every registered prefix, sorted
    pub fn prefixes(&self, deadline: &Deadline) -> Result<Vec<String>> {
        deadline.check("set_members")?;
        let mut prefixes = self.store.set_members(self.keys.registry())?;
        prefixes.sort();
        Ok(prefixes)
    }

    fn source_keys(&self, prefixes: &[String]) -> Vec<String> {
        prefixes.iter().map(|p| self.keys.prefix(p)).collect()
    }
}
