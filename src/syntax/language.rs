//! Language definitions
//!
//! A [`LanguageDefinition`] ties a lexer to the files it handles: file
//! extensions, an optional first line pattern for scripts without one,
//! and the keyword lists a fresh lexer starts with.

use std::path::Path;

use regex::Regex;

use super::lexer::Lexer;

/// A language the highlighter knows how to lex
pub struct LanguageDefinition {
    /// Language name (e.g., "Haskell", "R")
    pub name: String,
    /// File extensions (e.g., ["hs"], ["r", "R"])
    pub extensions: Vec<String>,
    /// Pattern matched against the first line, for `#!` scripts
    first_line: Option<Regex>,
    /// Builds a lexer with default options
    factory: fn() -> Box<dyn Lexer>,
    /// Default word lists by slot
    keywords: Vec<(usize, &'static str)>,
}

impl LanguageDefinition {
    /// Create a definition lexed by lexers from `factory`
    pub fn new(name: &str, factory: fn() -> Box<dyn Lexer>) -> Self {
        Self {
            name: name.to_string(),
            extensions: Vec::new(),
            first_line: None,
            factory,
            keywords: Vec::new(),
        }
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// Set the first line pattern; returns false if it does not compile
    pub fn set_first_line(&mut self, pattern: &str) -> bool {
        self.first_line = Regex::new(pattern).ok();
        self.first_line.is_some()
    }

    /// Add a default word list
    pub fn add_keywords(&mut self, slot: usize, words: &'static str) {
        self.keywords.push((slot, words));
    }

    /// Whether `path` has one of this language's extensions
    ///
    /// Extensions compare exactly first, then ignoring case.
    pub fn matches_path(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|e| e == ext)
            || self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Whether the first line of a file marks it as this language
    pub fn matches_first_line(&self, line: &str) -> bool {
        self.first_line.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Create a lexer with the default word lists loaded
    pub fn create_lexer(&self) -> Box<dyn Lexer> {
        let mut lexer = (self.factory)();
        for &(slot, words) in &self.keywords {
            if let Err(err) = lexer.word_list_set(slot, words) {
                tracing::warn!(language = %self.name, slot, %err, "default keywords rejected");
            }
        }
        lexer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::r::RLexer;

    fn create_test_language() -> LanguageDefinition {
        let mut lang = LanguageDefinition::new("Test", || Box::new(RLexer::new()));
        lang.add_extension("t");
        lang.add_extension("Tst");
        assert!(lang.set_first_line(r"^#!.*\btest\b"));
        lang.add_keywords(0, "if else");
        lang
    }

    #[test]
    fn test_matches_path() {
        let lang = create_test_language();
        assert!(lang.matches_path(Path::new("a.t")));
        assert!(lang.matches_path(Path::new("dir/a.T")));
        assert!(lang.matches_path(Path::new("a.tst")));
        assert!(!lang.matches_path(Path::new("a.txt")));
        assert!(!lang.matches_path(Path::new("t")));
    }

    #[test]
    fn test_matches_first_line() {
        let lang = create_test_language();
        assert!(lang.matches_first_line("#!/usr/bin/env test"));
        assert!(!lang.matches_first_line("#!/bin/sh"));
        assert!(!LanguageDefinition::new("None", || Box::new(RLexer::new())).matches_first_line("#!test"));
    }

    #[test]
    fn test_invalid_first_line_pattern() {
        let mut lang = create_test_language();
        assert!(!lang.set_first_line("(unclosed"));
        assert!(!lang.matches_first_line("#!/usr/bin/env test"));
    }

    #[test]
    fn test_create_lexer_loads_keywords() {
        let lang = create_test_language();
        let mut lexer = lang.create_lexer();
        // Loading the same words again is not a change
        assert!(!lexer.word_list_set(0, "else if").unwrap());
        assert_eq!(lexer.name(), "R");
    }
}
