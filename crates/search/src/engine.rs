//! Typeahead engine
//!
//! Ties the components together:
//!
//! ```text
//! add/update/delete → PrefixExpander → PrefixIndex (+ ItemStore)
//! search            → PrefixIndex / CompositeQueryCache → ItemStore
//!                   → HotQueryTracker
//! ```
//!
//! The engine holds no mutable state; all of it lives in the store and is
//! shared with every other engine pointed at the same scope. No call sequence
//! here is atomic: a search racing an add may see the item under some
//! prefixes and not others, and a failed add leaves a partial fan-out until
//! it is retried. Retrying is always safe.

use crate::composite::{CompositePolicy, CompositeQueryCache};
use crate::config::TypeaheadConfig;
use crate::expander::{ExpandOptions, PrefixExpander};
use crate::hot::HotQueryTracker;
use crate::item_store::ItemStore;
use crate::phonetic::Transliterator;
use crate::prefix_index::PrefixIndex;
use crate::tokenizer::{normalize_query, unique, Tokenizer};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use typeahead_core::{item_id, Deadline, Item, KeySpace, Result, Store};

/// Options for add, update and delete
///
/// An item must be deleted with the same `pinyin` / `segment` flags it was
/// added with; otherwise some of its index entries are never found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOptions {
    /// Also index phonetic forms of every key
    pub pinyin: bool,
    /// Also index each token of the term
    pub segment: bool,
    /// Deadline for the whole operation; unset falls back to config
    pub deadline: Deadline,
}

impl IndexOptions {
    /// Enable phonetic keys
    pub fn with_pinyin(mut self) -> Self {
        self.pinyin = true;
        self
    }

    /// Enable token keys
    pub fn with_segment(mut self) -> Self {
        self.segment = true;
        self
    }

    /// Bound the operation by `deadline`
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    fn expand_options(&self) -> ExpandOptions {
        ExpandOptions {
            segment: self.segment,
            phonetic: self.pinyin,
        }
    }
}

/// Options for search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum results; unset falls back to config
    pub limit: Option<usize>,
    /// Fall back to token intersection/union when exact hits run short
    pub fuzzy: bool,
    /// Deadline for the whole search; unset falls back to config
    pub deadline: Deadline,
}

impl SearchOptions {
    /// Return at most `limit` results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Enable the fuzzy fallback
    pub fn fuzzy(mut self) -> Self {
        self.fuzzy = true;
        self
    }

    /// Bound the search by `deadline`
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Autocomplete engine over a shared store
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use typeahead_core::Item;
/// use typeahead_search::{IndexOptions, SearchOptions, Typeahead, TypeaheadConfig};
/// use typeahead_storage::MemoryStore;
///
/// let engine = Typeahead::new(Arc::new(MemoryStore::new()), TypeaheadConfig::default())?;
/// engine.add(&Item::new("Apple").with_score(10.0), &IndexOptions::default())?;
/// engine.add(&Item::new("Apricot").with_score(2.0), &IndexOptions::default())?;
///
/// let hits = engine.search("ap", &SearchOptions::default())?;
/// assert_eq!(hits.len(), 2);
/// assert_eq!(hits[0].term, "Apple");
/// # Ok::<(), typeahead_core::Error>(())
/// ```
#[derive(Clone)]
pub struct Typeahead {
    config: TypeaheadConfig,
    store: Arc<dyn Store>,
    keys: KeySpace,
    expander: PrefixExpander,
    items: ItemStore,
    index: PrefixIndex,
    composites: CompositeQueryCache,
    hot: HotQueryTracker,
}

impl Typeahead {
    /// Create an engine for `config.scope` over `store`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the config does not validate.
    pub fn new(store: Arc<dyn Store>, config: TypeaheadConfig) -> Result<Self> {
        config.validate()?;
        let policy = config.composite_policy()?;
        let keys = KeySpace::new(config.scope.clone());
        let index = PrefixIndex::new(store.clone(), keys.clone());
        Ok(Typeahead {
            items: ItemStore::new(store.clone(), keys.clone()),
            composites: CompositeQueryCache::new(store.clone(), keys.clone(), index.clone(), policy),
            hot: HotQueryTracker::new(store.clone(), keys.clone()),
            expander: PrefixExpander::default(),
            index,
            keys,
            store,
            config,
        })
    }

    /// Replace the tokenizer used for segmentation and fuzzy queries
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        let transliterator = self.expander.transliterator().clone();
        self.expander = PrefixExpander::new(tokenizer, transliterator);
        self
    }

    /// Replace the phonetic transliterator
    pub fn with_transliterator(mut self, transliterator: Arc<dyn Transliterator>) -> Self {
        self.expander = PrefixExpander::new(self.expander.tokenizer().clone(), transliterator);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &TypeaheadConfig {
        &self.config
    }

    /// Key layout of this engine's scope
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Composite policy in force
    pub fn composite_policy(&self) -> CompositePolicy {
        self.composites.policy()
    }

    /// Index keys `term` is reachable under with `options`
    pub fn expand(&self, term: &str, options: &IndexOptions) -> Vec<String> {
        self.expander.expand(term, options.expand_options())
    }

    fn deadline(&self, explicit: Deadline) -> Deadline {
        explicit.or(self.config.default_deadline())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Index `item`
    ///
    /// Writes the payload, then every key from the expansion with the item's
    /// score. Adding the same term again overwrites the payload and rescoring
    /// keys shared with the previous expansion; use [`Typeahead::update`] to
    /// also drop keys the new expansion no longer produces.
    ///
    /// # Errors
    ///
    /// `MalformedItem` before any store call if the item does not validate;
    /// store errors as they happen, with earlier writes left in place.
    pub fn add(&self, item: &Item, options: &IndexOptions) -> Result<()> {
        item.validate()?;
        let deadline = self.deadline(options.deadline);
        self.add_unchecked(item, options, &deadline)?;
        self.after_write(&deadline)
    }

    /// Index several items in order
    ///
    /// Every item is validated before the first write. Stops at the first
    /// store error; items before it stay indexed. Returns the count added.
    pub fn add_many(&self, items: &[Item], options: &IndexOptions) -> Result<usize> {
        for item in items {
            item.validate()?;
        }
        let deadline = self.deadline(options.deadline);
        for item in items {
            self.add_unchecked(item, options, &deadline)?;
        }
        self.after_write(&deadline)?;
        Ok(items.len())
    }

    /// Remove `item` from every key of its expansion, then drop its payload
    ///
    /// Only the term is used; the other fields may differ from what was
    /// added.
    pub fn delete(&self, item: &Item, options: &IndexOptions) -> Result<()> {
        item.validate()?;
        let deadline = self.deadline(options.deadline);
        self.delete_unchecked(item, options, &deadline)?;
        self.after_write(&deadline)
    }

    /// Delete then re-add `item`, both with `options`
    pub fn update(&self, item: &Item, options: &IndexOptions) -> Result<()> {
        item.validate()?;
        let deadline = self.deadline(options.deadline);
        self.delete_unchecked(item, options, &deadline)?;
        self.add_unchecked(item, options, &deadline)?;
        self.after_write(&deadline)
    }

    fn add_unchecked(&self, item: &Item, options: &IndexOptions, deadline: &Deadline) -> Result<()> {
        let id = item_id(&item.term);
        self.items.put(&id, item, deadline)?;
        let keys = self.expand(&item.term, options);
        for key in &keys {
            self.index.index_prefix(key, &id, item.score, deadline)?;
        }
        debug!(target: "typeahead::index", term = %item.term, keys = keys.len(), score = item.score, "Item indexed");
        Ok(())
    }

    fn delete_unchecked(&self, item: &Item, options: &IndexOptions, deadline: &Deadline) -> Result<()> {
        let id = item_id(&item.term);
        let keys = self.expand(&item.term, options);
        let mut dropped = 0;
        for key in &keys {
            if self.index.unindex_prefix(key, &id, deadline)? {
                dropped += 1;
            }
        }
        self.items.remove(&id, deadline)?;
        debug!(target: "typeahead::index", term = %item.term, keys = keys.len(), dropped, "Item removed");
        Ok(())
    }

    fn after_write(&self, deadline: &Deadline) -> Result<()> {
        if self.config.invalidate_composites_on_write
            && self.composites.policy() == CompositePolicy::Persistent
        {
            self.composites.invalidate_all(deadline)?;
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Ranked completions for `query`
    ///
    /// 1. The normalized query is looked up as a literal prefix.
    /// 2. With `fuzzy`, if that found fewer than `limit` ids and the query
    ///    has more than one distinct token, ids from the token intersection
    ///    and then the token union are appended, skipping duplicates.
    /// 3. The query is counted as issued, hits or not.
    /// 4. Ids are resolved to items; ids without a payload are dropped.
    ///
    /// Results keep tier order (exact, intersection, union); scores only
    /// order ids within a tier. A blank query returns nothing and touches no
    /// store key.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Item>> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = options.limit.unwrap_or(self.config.default_limit);
        let deadline = self.deadline(options.deadline);

        let mut ids = self.index.range_by_score_desc(&query, 0, limit, &deadline)?;
        let exact = ids.len();

        if options.fuzzy && ids.len() < limit {
            let tokens = unique(self.expander.tokenizer().tokenize(&query));
            if tokens.len() > 1 {
                let intersection = self.composites.intersect(&tokens, limit, &deadline)?;
                let union = self.composites.union(&tokens, limit, &deadline)?;
                merge_tiers(&mut ids, [intersection, union], limit);
            }
        }

        self.hot.record(&query, &deadline)?;

        let resolved = self.items.get_many(&ids, &deadline)?;
        let found = resolved.len();
        let items: Vec<Item> = resolved.into_iter().flatten().collect();
        if items.len() < found {
            debug!(target: "typeahead::search", query = %query, stale = found - items.len(), "Dropped ids without payload");
        }
        debug!(target: "typeahead::search", query = %query, exact, total = items.len(), fuzzy = options.fuzzy, "Search completed");
        Ok(items)
    }

    /// Item stored for `term`, if any
    pub fn get(&self, term: &str) -> Result<Option<Item>> {
        let deadline = self.deadline(Deadline::none());
        self.items.get(&item_id(term), &deadline)
    }

    /// The `limit` most issued queries, most popular first
    pub fn top_queries(&self, limit: usize) -> Result<Vec<String>> {
        let deadline = self.deadline(Deadline::none());
        self.hot.top_queries(limit, &deadline)
    }

    /// The `limit` most issued queries with their counts
    pub fn top_queries_with_counts(&self, limit: usize) -> Result<Vec<(String, u64)>> {
        let deadline = self.deadline(Deadline::none());
        self.hot.top_queries_with_counts(limit, &deadline)
    }

    /// Every registered prefix, sorted
    pub fn prefixes(&self) -> Result<Vec<String>> {
        let deadline = self.deadline(Deadline::none());
        self.index.prefixes(&deadline)
    }

    /// Number of stored items
    pub fn len(&self) -> Result<usize> {
        let deadline = self.deadline(Deadline::none());
        self.items.len(&deadline)
    }

    /// Whether no item is stored
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Access to the prefix index
    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop every persisted composite set; returns how many
    pub fn invalidate_composites(&self) -> Result<usize> {
        let deadline = self.deadline(Deadline::none());
        self.composites.invalidate_all(&deadline)
    }

    /// Remove every key of this scope: prefix sets, registry, items,
    /// composites and query counts
    pub fn purge(&self) -> Result<()> {
        let deadline = self.deadline(Deadline::none());
        let prefixes = self.index.prefixes(&deadline)?;
        for prefix in &prefixes {
            deadline.check("delete")?;
            self.store.delete(&self.index.set_key(prefix))?;
        }
        for key in [self.keys.registry(), self.keys.items(), self.keys.hot()] {
            deadline.check("delete")?;
            self.store.delete(key)?;
        }
        self.composites.invalidate_all(&deadline)?;
        info!(target: "typeahead::index", scope = self.keys.scope(), prefixes = prefixes.len(), "Scope purged");
        Ok(())
    }
}

/// Append ids from each tier in order, skipping ids already present, until
/// `limit` is reached
fn merge_tiers<const N: usize>(ids: &mut Vec<String>, tiers: [Vec<String>; N], limit: usize) {
    let mut seen: HashSet<String> = ids.iter().cloned().collect();
    for id in tiers.into_iter().flatten() {
        if ids.len() >= limit {
            break;
        }
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }
}
