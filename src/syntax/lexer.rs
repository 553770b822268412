//! Host-facing lexer interface
//!
//! A [`Lexer`] styles and folds byte ranges of a [`Document`]. Lexers
//! are configured through named properties and numbered word lists and
//! keep no other state between calls, so hosts can restyle any range
//! whose preceding line state is known.

use super::document::Document;
use super::options::PropertyType;
use super::tokens::TokenType;
use crate::error::Result;

pub trait Lexer {
    /// Language name
    fn name(&self) -> &'static str;

    /// Names of the properties this lexer understands
    fn property_names(&self) -> Vec<&'static str>;

    /// Type of a property, `None` if unknown
    fn property_type(&self, name: &str) -> Option<PropertyType>;

    /// Description of a property, `None` if unknown
    fn describe_property(&self, name: &str) -> Option<&'static str>;

    /// Set a property; returns whether the value changed (and the
    /// document needs restyling)
    fn property_set(&mut self, name: &str, value: &str) -> Result<bool>;

    /// Descriptions of the word list slots, in slot order
    fn describe_word_lists(&self) -> &'static [&'static str];

    /// Replace the words in `slot`; returns whether the list changed
    fn word_list_set(&mut self, slot: usize, words: &str) -> Result<bool>;

    /// Style `[start, start + length)` starting in `init_style`
    ///
    /// `start` should be a line start; the line state of the line before
    /// it must already be up to date.
    fn lex(&mut self, doc: &mut dyn Document, start: usize, length: usize, init_style: TokenType);

    /// Compute fold levels for the lines of `[start, start + length)`
    ///
    /// Reads the styles written by [`lex`](Self::lex).
    fn fold(&mut self, doc: &mut dyn Document, start: usize, length: usize, init_style: TokenType);
}
