//! Text tokenizer for segmentation and fuzzy queries
//!
//! Pipeline: UAX#29 word boundaries → lowercase → drop blank tokens
//!
//! Unlike a relevance tokenizer there is no stopword removal and no
//! stemming: a token is indexed exactly as the user would type it.
//! Han text is split per character by UAX#29; callers needing dictionary
//! segmentation plug their own [`Tokenizer`].

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into index tokens
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text`; tokens are lowercase and never blank
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Default tokenizer built on Unicode word boundaries
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeTokenizer;

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }
}

/// Tokenize text into index tokens
///
/// # Example
///
/// ```
/// use typeahead_search::tokenizer::tokenize;
///
/// let tokens = tokenize("New York City");
/// assert_eq!(tokens, vec!["new", "york", "city"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.trim().is_empty())
        .collect()
}

/// Deduplicate tokens, keeping first occurrences in order
pub fn unique(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Normalize a raw query: trim surrounding whitespace and lowercase
///
/// An empty result means there is nothing to search for.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("Hello, World!");
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn test_tokenize_keeps_short_tokens() {
        // Single characters are valid completions
        let tokens = tokenize("I am a test");
        assert_eq!(tokens, vec!["i", "am", "a", "test"]);
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("route 66");
        assert_eq!(tokens, vec!["route", "66"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
    }

    #[test]
    fn test_tokenize_only_punctuation() {
        assert!(tokenize("...---...").is_empty());
    }

    #[test]
    fn test_tokenize_han_per_character() {
        let tokens = tokenize("北京");
        assert_eq!(tokens, vec!["北", "京"]);
    }

    #[test]
    fn test_unique_preserves_order() {
        let tokens = unique(tokenize("apple banana Apple cherry"));
        assert_eq!(tokens, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  CaT "), "cat");
        assert_eq!(normalize_query("New York"), "new york");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_trait_object() {
        let tokenizer: Box<dyn Tokenizer> = Box::new(UnicodeTokenizer);
        assert_eq!(tokenizer.tokenize("a-b"), vec!["a", "b"]);
    }
}
