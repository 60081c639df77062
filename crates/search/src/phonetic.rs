//! Phonetic transliteration of index keys
//!
//! Lets users reach a term by typing its spelling in ASCII: a Han prefix
//! such as "北京" is also indexed as "beijing".

use pinyin::ToPinyin;

/// Maps text to a canonical ASCII spelling
pub trait Transliterator: Send + Sync {
    /// Transliterate `text`; may return `text` unchanged
    fn transliterate(&self, text: &str) -> String;
}

/// Tone-less pinyin for Han characters, everything else passed through
///
/// Each character is read on its own with its most common reading, so a
/// polyphone takes the same reading in every word: 重庆 comes out as
/// "zhongqing", not "chongqing". Terms whose usual spelling relies on word
/// context need a [`Transliterator`] backed by a phrase dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinTransliterator;

impl Transliterator for PinyinTransliterator {
    fn transliterate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c.to_pinyin() {
                Some(p) => out.push_str(p.plain()),
                None => out.push(c),
            }
        }
        out
    }
}
