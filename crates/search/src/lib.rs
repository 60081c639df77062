//! Prefix-indexed autocomplete over a shared ranked-set store
//!
//! This crate provides:
//! - PrefixExpander: term → index keys (char prefixes, tokens, phonetic forms)
//! - ItemStore: item payloads by id
//! - PrefixIndex: prefix → ranked item ids, plus the prefix registry
//! - CompositeQueryCache: intersection/union sets for multi-token queries
//! - HotQueryTracker: query popularity counts
//! - Typeahead: the engine tying them together
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use typeahead_core::Item;
//! use typeahead_search::{IndexOptions, SearchOptions, Typeahead, TypeaheadConfig};
//! use typeahead_storage::MemoryStore;
//!
//! let engine = Typeahead::new(Arc::new(MemoryStore::new()), TypeaheadConfig::default()).unwrap();
//! engine
//!     .add(&Item::new("Apple").with_score(10.0), &IndexOptions::default())
//!     .unwrap();
//!
//! let hits = engine.search("app", &SearchOptions::default()).unwrap();
//! assert_eq!(hits[0].term, "Apple");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composite;
pub mod config;
pub mod engine;
pub mod expander;
pub mod hot;
pub mod item_store;
pub mod phonetic;
pub mod prefix_index;
pub mod tokenizer;

// Re-export commonly used types
pub use composite::{CompositePolicy, CompositeQueryCache};
pub use config::TypeaheadConfig;
pub use engine::{IndexOptions, SearchOptions, Typeahead};
pub use expander::{ExpandOptions, PrefixExpander};
pub use hot::HotQueryTracker;
pub use item_store::ItemStore;
pub use phonetic::{PinyinTransliterator, Transliterator};
pub use prefix_index::PrefixIndex;
pub use tokenizer::{Tokenizer, UnicodeTokenizer};
