//! Prefix expansion
//!
//! Decides which index keys a term is reachable under:
//! 1. Every character prefix of the trimmed, lowercased term ("a", "ap", ...)
//! 2. With `segment`, every token of the term as a whole key (tokens are
//!    not prefixed further)
//! 3. With `phonetic`, the transliteration of every key from 1 and 2
//!
//! The output is deduplicated and keeps first-seen order. Blank keys are
//! never produced.

use crate::phonetic::{PinyinTransliterator, Transliterator};
use crate::tokenizer::{normalize_query, Tokenizer, UnicodeTokenizer};
use std::collections::HashSet;
use std::sync::Arc;

/// Which key families to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Add each token of the term
    pub segment: bool,
    /// Add the phonetic form of every key
    pub phonetic: bool,
}

/// Produces the index keys for a term
#[derive(Clone)]
pub struct PrefixExpander {
    tokenizer: Arc<dyn Tokenizer>,
    transliterator: Arc<dyn Transliterator>,
}

impl Default for PrefixExpander {
    fn default() -> Self {
        Self::new(Arc::new(UnicodeTokenizer), Arc::new(PinyinTransliterator))
    }
}

impl std::fmt::Debug for PrefixExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixExpander").finish_non_exhaustive()
    }
}

impl PrefixExpander {
    /// Create an expander with the given collaborators
    pub fn new(tokenizer: Arc<dyn Tokenizer>, transliterator: Arc<dyn Transliterator>) -> Self {
        PrefixExpander {
            tokenizer,
            transliterator,
        }
    }

    /// Tokenizer used for segmentation
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Transliterator used for phonetic keys
    pub fn transliterator(&self) -> &Arc<dyn Transliterator> {
        &self.transliterator
    }

    /// Expand `term` into index keys
    ///
    /// # Example
    ///
    /// ```
    /// use typeahead_search::{ExpandOptions, PrefixExpander};
    ///
    /// let keys = PrefixExpander::default().expand("Cat", ExpandOptions::default());
    /// assert_eq!(keys, vec!["c", "ca", "cat"]);
    /// ```
    pub fn expand(&self, term: &str, options: ExpandOptions) -> Vec<String> {
        let mut keys = char_prefixes(term);
        if options.segment {
            keys.extend(self.tokenizer.tokenize(term));
        }
        if options.phonetic {
            let phonetic: Vec<String> = keys
                .iter()
                .map(|k| self.transliterator.transliterate(k))
                .collect();
            keys.extend(phonetic);
        }

        let mut seen = HashSet::with_capacity(keys.len());
        keys.into_iter()
            .filter(|k| !k.trim().is_empty())
            .filter(|k| seen.insert(k.clone()))
            .collect()
    }
}

/// Every non-empty character prefix of the trimmed, lowercased term
///
/// The term is normalized the same way as a query, so searching for a term
/// always lands on the last rung of its ladder. Prefixes end on `char`
/// boundaries, so multi-byte text is never split inside a character.
pub fn char_prefixes(term: &str) -> Vec<String> {
    let lower = normalize_query(term);
    lower
        .char_indices()
        .map(|(i, c)| lower[..i + c.len_utf8()].to_string())
        .collect()
}
