//! Storage backends for typeahead
//!
//! This crate implements the [`Store`](typeahead_core::Store) port in process:
//! - MemoryStore: DashMap-backed keyspace of field maps, sets and ranked sets
//! - RankedSet: score-ordered member set with Redis range semantics
//! - testing: call counting and failure injection around any store
//!
//! A deployment sharing state between processes puts a network store behind
//! the same trait; `MemoryStore` is the reference for its semantics.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod ranked;
pub mod testing;

pub use memory::MemoryStore;
pub use ranked::RankedSet;
