//! Typeahead - prefix-indexed autocomplete over a ranked-set store
//!
//! Items (a term, a score and arbitrary payload fields) are indexed under
//! every character prefix of their term, optionally under each token and
//! under phonetic (pinyin) forms. Searches return the highest-scored items
//! for a prefix, with an optional fuzzy fallback over the query's tokens,
//! and every query is counted for popularity tracking.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use typeahead::{IndexOptions, Item, MemoryStore, SearchOptions, Typeahead, TypeaheadConfig};
//!
//! let engine = Typeahead::new(Arc::new(MemoryStore::new()), TypeaheadConfig::default())?;
//!
//! engine.add(&Item::new("Apple").with_score(10.0), &IndexOptions::default())?;
//! engine.add(&Item::new("Application").with_score(1.0), &IndexOptions::default())?;
//!
//! let hits = engine.search("app", &SearchOptions::default())?;
//! assert_eq!(hits[0].term, "Apple");
//! assert_eq!(engine.top_queries(1)?, vec!["app"]);
//! # Ok::<(), typeahead::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `typeahead-core`: item model, errors, deadlines, key layout and the
//!   [`Store`] trait
//! - `typeahead-storage`: [`MemoryStore`] and test instrumentation
//! - `typeahead-search`: the [`Typeahead`] engine and its components
//!
//! Any backend implementing [`Store`] can hold the index; all engine state
//! lives there, so engines on different threads or hosts share it.

pub use typeahead_core::{
    item_id, CompositeKind, Deadline, Error, Item, KeySpace, Result, Store, Value,
};
pub use typeahead_search::{
    CompositePolicy, CompositeQueryCache, ExpandOptions, HotQueryTracker, IndexOptions,
    ItemStore, PinyinTransliterator, PrefixExpander, PrefixIndex, SearchOptions, Tokenizer,
    Transliterator, Typeahead, TypeaheadConfig, UnicodeTokenizer,
};
pub use typeahead_storage::{testing, MemoryStore, RankedSet};
