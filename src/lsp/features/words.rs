//! Word tokenization shared by hover and the diagnostic scan.
//!
//! A word is a run of ASCII word characters (`[A-Za-z0-9_]`), optionally
//! joined by hyphens, so `abort-controller` is one token and a trailing hyphen
//! is never part of one. Word characters are ASCII only, the way JavaScript's
//! `\w` treats them: `café` yields the token `caf`.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+(?:-+[A-Za-z0-9_]+)*").expect("word pattern is a valid regex"));

/// A token and its byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'t> {
    pub text: &'t str,
    pub start: usize,
    pub end: usize,
}

impl Word<'_> {
    pub fn byte_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// All words of `text` in document order.
pub fn words(text: &str) -> impl Iterator<Item = Word<'_>> {
    WORD_PATTERN.find_iter(text).map(|m| Word {
        text: m.as_str(),
        start: m.start(),
        end: m.end(),
    })
}

/// The word touching byte offset `offset`, if any. A cursor sitting directly
/// after the last character of a word still selects that word.
pub fn word_at(text: &str, offset: usize) -> Option<Word<'_>> {
    words(text)
        .take_while(|w| w.start <= offset)
        .find(|w| offset <= w.end)
}
