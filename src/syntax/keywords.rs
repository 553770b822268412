//! Keyword lists
//!
//! A [`WordList`] is an exact-match set of words, configured from a
//! whitespace separated string the way editor property files list them.

use std::collections::HashSet;

/// Set of words matched by exact text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from whitespace separated words
    pub fn from_words(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Replace the contents; returns whether anything changed
    pub fn set(&mut self, text: &str) -> bool {
        let new = Self::from_words(text);
        if new == *self {
            return false;
        }
        *self = new;
        true
    }

    /// Exact membership test
    pub fn in_list(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
