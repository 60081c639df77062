//! Core types and traits for typeahead
//!
//! This crate defines the foundational types used throughout the system:
//! - Item / Value: indexed entries and their payload fields
//! - KeySpace: store key layout for a scope
//! - Store: the backing store port
//! - Deadline: per-call time bound for store round trips
//! - identity: stable item ids
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deadline;
pub mod error;
pub mod identity;
pub mod item;
pub mod keys;
pub mod traits;

// Re-export commonly used types and traits
pub use deadline::Deadline;
pub use error::{Error, Result};
pub use identity::item_id;
pub use item::{Item, Value};
pub use keys::{CompositeKind, KeySpace};
pub use traits::Store;
