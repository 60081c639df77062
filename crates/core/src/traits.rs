//! Backing store abstraction
//!
//! The engine keeps no state of its own: every item, prefix set and counter
//! lives in a store shared by all callers. This trait is the port the engine
//! depends on; a Redis connection, an in-process map or a test double can sit
//! behind it.
//!
//! Every method is one store round trip. Implementations are expected to make
//! each call atomic on its own key, but the engine never assumes atomicity
//! across calls or across keys.
//!
//! Thread safety: All methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync).

use crate::error::Result;

/// Ordered key-value store with field maps, sets and score-ranked sets
pub trait Store: Send + Sync {
    // ------------------------------------------------------------------
    // Field maps
    // ------------------------------------------------------------------

    /// Set `field` of the map at `key` to `value`, creating the map if needed
    fn map_put(&self, key: &str, field: &str, value: &str) -> Result<()>;

    /// Read several fields of the map at `key`
    ///
    /// The result has one slot per requested field, in request order;
    /// missing fields (or a missing map) yield `None`.
    fn map_get_many(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>>;

    /// Remove `field` from the map at `key`
    ///
    /// Returns whether the field existed. Removing the last field deletes
    /// the map.
    fn map_remove(&self, key: &str, field: &str) -> Result<bool>;

    /// Number of fields in the map at `key` (0 if absent)
    fn map_len(&self, key: &str) -> Result<usize>;

    // ------------------------------------------------------------------
    // Sets and keys
    // ------------------------------------------------------------------

    /// Add `member` to the set at `key`; returns whether it was new
    fn set_add(&self, key: &str, member: &str) -> Result<bool>;

    /// Remove `member` from the set at `key`; returns whether it was present
    ///
    /// Removing the last member deletes the set.
    fn set_remove(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of the set at `key`, in unspecified order
    fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// Whether any structure exists at `key`
    fn exists(&self, key: &str) -> Result<bool>;

    /// Delete whatever structure exists at `key`; returns whether one did
    fn delete(&self, key: &str) -> Result<bool>;

    // ------------------------------------------------------------------
    // Ranked sets
    // ------------------------------------------------------------------

    /// Insert `member` with `score`, overwriting an existing score
    fn ranked_upsert(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Remove `member`; returns whether it was present
    ///
    /// Removing the last member deletes the ranked set.
    fn ranked_remove(&self, key: &str, member: &str) -> Result<bool>;

    /// Number of members (0 if absent)
    fn ranked_cardinality(&self, key: &str) -> Result<usize>;

    /// Members ordered by score, highest first
    ///
    /// Skips `offset` members and returns at most `limit`. Order among equal
    /// scores is backend-defined.
    fn ranked_range_desc(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>>;

    /// Like [`Store::ranked_range_desc`] but with each member's score
    fn ranked_range_desc_with_scores(
        &self,
        key: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(String, f64)>>;

    /// Score of `member`, if present
    fn ranked_score(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Add `delta` to the score of `member` (creating it at `delta`)
    ///
    /// Returns the new score.
    fn ranked_increment(&self, key: &str, member: &str, delta: f64) -> Result<f64>;

    /// Store at `dest` the members present in every source, scores summed
    ///
    /// A missing source counts as empty. `dest` is replaced; an empty result
    /// leaves no key at `dest`. Returns the resulting cardinality.
    fn ranked_intersect_into(&self, dest: &str, sources: &[String]) -> Result<usize>;

    /// Store at `dest` the members present in any source, scores summed
    ///
    /// Same replacement rules as [`Store::ranked_intersect_into`].
    fn ranked_union_into(&self, dest: &str, sources: &[String]) -> Result<usize>;
}
