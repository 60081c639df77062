//! Stable item identity
//!
//! An item's id is the SHA-256 digest of its raw term, hex encoded. The term
//! is hashed as given (not lowercased), so "Apple" and "apple" are distinct
//! items. Two terms colliding is not handled.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Length of an item id in hex characters
pub const ITEM_ID_LEN: usize = 64;

/// Compute the id of the item with `term`
///
/// # Example
///
/// ```
/// use typeahead_core::identity::{item_id, ITEM_ID_LEN};
///
/// let id = item_id("Apple");
/// assert_eq!(id.len(), ITEM_ID_LEN);
/// assert_eq!(id, item_id("Apple"));
/// ```
pub fn item_id(term: &str) -> String {
    let digest = Sha256::digest(term.as_bytes());
    let mut out = String::with_capacity(ITEM_ID_LEN);
    for byte in digest {
        // Writing to a String cannot fail
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
