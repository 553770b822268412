//! Syntax highlighting manager
//!
//! This module provides the SyntaxManager that coordinates language
//! detection and lexer configuration, and the Highlighter that keeps a
//! document styled incrementally as it is edited.

use std::path::Path;

use tracing::{debug, trace};

use super::builtin;
use super::document::Document;
use super::fold::FoldLevel;
use super::language::LanguageDefinition;
use super::lexer::Lexer;
use super::tokens::TokenType;
use crate::config::Config;
use crate::error::{Error, Result};

/// Main syntax highlighting manager
pub struct SyntaxManager {
    /// Loaded language definitions
    languages: Vec<LanguageDefinition>,
    /// Settings applied to every lexer created
    config: Config,
}

impl SyntaxManager {
    /// Create a new syntax manager with built-in languages
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a manager whose lexers are configured from `config`
    pub fn with_config(config: Config) -> Self {
        let mut manager = Self {
            languages: Vec::new(),
            config,
        };

        for lang in builtin::all_languages() {
            manager.add_language(lang);
        }

        manager
    }

    /// Add a language definition, replacing one with the same name
    pub fn add_language(&mut self, lang: LanguageDefinition) {
        self.languages.retain(|l| !l.name.eq_ignore_ascii_case(&lang.name));
        self.languages.push(lang);
    }

    /// Detect language from filename, falling back to the first line
    pub fn detect_language(&self, filename: &Path, first_line: Option<&str>) -> Option<&str> {
        let by_path = self.languages.iter().find(|l| l.matches_path(filename));
        let lang = by_path.or_else(|| {
            let line = first_line?;
            self.languages.iter().find(|l| l.matches_first_line(line))
        })?;
        Some(lang.name.as_str())
    }

    /// Get a language definition by name, ignoring case
    pub fn get_language(&self, name: &str) -> Option<&LanguageDefinition> {
        self.languages
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// List available languages
    pub fn list_languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.languages.iter().map(|l| l.name.as_str()).collect();
        names.sort();
        names
    }

    /// Create a configured lexer for a language
    pub fn create_lexer(&self, name: &str) -> Result<Box<dyn Lexer>> {
        let lang = self
            .get_language(name)
            .ok_or_else(|| Error::UnknownLanguage(name.to_string()))?;
        let mut lexer = lang.create_lexer();
        self.config.apply_to(lexer.as_mut())?;
        debug!(language = %lang.name, "created lexer");
        Ok(lexer)
    }

    /// Start a highlighting session for a language
    pub fn highlighter(&self, name: &str) -> Result<Highlighter> {
        Ok(Highlighter::new(self.create_lexer(name)?))
    }
}

impl Default for SyntaxManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Incremental styling of one document
///
/// Tracks how far the document is styled. Edits move that point back;
/// styling always restarts at a line start, in the style of the byte
/// before it, so the lexer can pick up the saved line state.
///
/// An emptied document has its first line's state and level reset, since
/// there is nothing left to lex.
pub struct Highlighter {
    lexer: Box<dyn Lexer>,
    /// Bytes before this position are styled and folded
    end_styled: usize,
}

impl Highlighter {
    pub fn new(lexer: Box<dyn Lexer>) -> Self {
        Self {
            lexer,
            end_styled: 0,
        }
    }

    /// The lexer driving this session
    pub fn lexer(&self) -> &dyn Lexer {
        self.lexer.as_ref()
    }

    /// Position up to which the document is styled
    pub fn end_styled(&self) -> usize {
        self.end_styled
    }

    /// Set a lexer property, restyling everything if it changed
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<()> {
        if self.lexer.property_set(key, value)? {
            self.invalidate_all();
        }
        Ok(())
    }

    /// Replace a word list, restyling everything if it changed
    pub fn set_keywords(&mut self, slot: usize, words: &str) -> Result<()> {
        if self.lexer.word_list_set(slot, words)? {
            self.invalidate_all();
        }
        Ok(())
    }

    /// Forget all styling
    pub fn invalidate_all(&mut self) {
        self.end_styled = 0;
    }

    /// Note that the text changed at `pos`
    ///
    /// Restyling starts on the line holding the byte before `pos`: an edit
    /// can split a CRLF pair and turn that byte into a line end.
    pub fn edit(&mut self, pos: usize) {
        self.end_styled = self.end_styled.min(pos.saturating_sub(1));
    }

    /// Style and fold whole lines until `pos` is covered
    pub fn ensure_styled_to(&mut self, doc: &mut dyn Document, pos: usize) {
        if doc.length() == 0 {
            doc.set_line_state(0, 0);
            doc.set_level(0, FoldLevel::BASE);
            self.end_styled = 0;
            return;
        }

        let pos = pos.min(doc.length());
        self.end_styled = self.end_styled.min(doc.length());
        if pos <= self.end_styled {
            return;
        }

        let start = doc.line_start(doc.line_from_position(self.end_styled));
        let end = doc.line_start(doc.line_from_position(pos - 1) + 1);
        let init_style = if start > 0 {
            TokenType::from_id(doc.style_at(start - 1))
        } else {
            TokenType::Default
        };
        trace!(start, end, ?init_style, "restyling");

        self.lexer.lex(doc, start, end - start, init_style);
        self.lexer.fold(doc, start, end - start, init_style);
        self.end_styled = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::document::TextBuffer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_language() {
        let manager = SyntaxManager::new();

        assert_eq!(manager.detect_language(Path::new("Main.hs"), None), Some("Haskell"));
        assert_eq!(manager.detect_language(Path::new("Setup.lhs"), None), Some("Haskell"));
        assert_eq!(manager.detect_language(Path::new("plot.R"), None), Some("R"));
        assert_eq!(manager.detect_language(Path::new("plot.r"), None), Some("R"));
        assert_eq!(manager.detect_language(Path::new("site.Rprofile"), None), Some("R"));
        assert_eq!(manager.detect_language(Path::new("main.c"), None), None);
        assert_eq!(manager.detect_language(Path::new("no_extension"), None), None);
    }

    #[test]
    fn test_detect_by_first_line() {
        let manager = SyntaxManager::new();

        assert_eq!(
            manager.detect_language(Path::new("build"), Some("#!/usr/bin/env runghc")),
            Some("Haskell")
        );
        assert_eq!(
            manager.detect_language(Path::new("report"), Some("#!/usr/bin/env Rscript")),
            Some("R")
        );
        assert_eq!(
            manager.detect_language(Path::new("run"), Some("#!/bin/sh")),
            None
        );
        // The extension wins over the first line
        assert_eq!(
            manager.detect_language(Path::new("x.hs"), Some("#!/usr/bin/env Rscript")),
            Some("Haskell")
        );
    }

    #[test]
    fn test_list_and_lookup() {
        let manager = SyntaxManager::new();
        assert_eq!(manager.list_languages(), vec!["Haskell", "R"]);
        assert!(manager.get_language("haskell").is_some());
        assert!(matches!(
            manager.create_lexer("cobol"),
            Err(Error::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_config_applied_to_lexers() {
        let config = Config::parse("[languages.haskell.properties]\nfold = true").unwrap();
        let manager = SyntaxManager::with_config(config);
        let mut hl = manager.highlighter("Haskell").unwrap();

        let mut doc = TextBuffer::new("f =\n  x\n");
        let len = doc.length();
        hl.ensure_styled_to(&mut doc, len);
        assert!(FoldLevel::from_raw(doc.level(0)).header);
        assert_eq!(doc.token_at(0), TokenType::Identifier);
    }

    #[test]
    fn test_styles_whole_lines() {
        let manager = SyntaxManager::new();
        let mut hl = manager.highlighter("R").unwrap();
        let mut doc = TextBuffer::new("x <- 1\ny <- 2\nz <- 3\n");

        hl.ensure_styled_to(&mut doc, 2);
        assert_eq!(hl.end_styled(), doc.line_start(1));
        assert_eq!(doc.token_at(5), TokenType::Number);
        assert_eq!(doc.token_at(12), TokenType::Default);

        hl.ensure_styled_to(&mut doc, 1);
        assert_eq!(hl.end_styled(), doc.line_start(1));

        let len = doc.length();
        hl.ensure_styled_to(&mut doc, len);
        assert_eq!(hl.end_styled(), len);
        assert_eq!(doc.token_at(12), TokenType::Number);
    }

    /// Styles, line states and levels after editing must match a fresh lex
    fn assert_restyle_matches_fresh(language: &str, text: &str, at: usize, inserted: &str) {
        let config = Config::parse("[properties]\nfold = true").unwrap();
        let manager = SyntaxManager::with_config(config);

        let mut doc = TextBuffer::new(text);
        let mut hl = manager.highlighter(language).unwrap();
        let len = doc.length();
        hl.ensure_styled_to(&mut doc, len);

        doc.insert(at, inserted);
        hl.edit(at);
        let len = doc.length();
        hl.ensure_styled_to(&mut doc, len);

        let mut fresh = TextBuffer::new(&doc.text_range(0, len));
        let mut fresh_hl = manager.highlighter(language).unwrap();
        fresh_hl.ensure_styled_to(&mut fresh, len);

        assert_eq!(doc.styles(), fresh.styles());
        let lines = doc.line_count();
        let states = |d: &TextBuffer| (0..lines).map(|l| d.line_state(l)).collect::<Vec<_>>();
        let levels = |d: &TextBuffer| (0..lines).map(|l| d.level(l)).collect::<Vec<_>>();
        assert_eq!(states(&doc), states(&fresh));
        assert_eq!(levels(&doc), levels(&fresh));
    }

    #[test]
    fn test_haskell_restyle_after_opening_comment() {
        let text = "module M where\nf x =\n  x + 1\ng = 2\n";
        assert_restyle_matches_fresh("Haskell", text, 15, "{- ");
    }

    #[test]
    fn test_haskell_restyle_after_closing_comment() {
        let text = "{- a\n{- b -}\nf = 1\n";
        assert_restyle_matches_fresh("Haskell", text, 5, "-}\n");
    }

    #[test]
    fn test_r_restyle_inside_raw_string() {
        let text = "x <- r\"(a\nb)\"\nf <- function() {\n  1\n}\n";
        assert_restyle_matches_fresh("R", text, 10, ")\" + r\"(");
    }

    #[test]
    fn test_r_restyle_adding_brace() {
        let text = "f <- function() {\n  1\n}\ng <- 2\n";
        assert_restyle_matches_fresh("R", text, 18, "  if (x) {\n");
    }

    #[test]
    fn test_restyle_after_splitting_crlf() {
        assert_restyle_matches_fresh("Haskell", "\"a\r\nb\n", 3, "x");
        let text = "{-# LANGUAGE X #-}\n\"{#\r\nmodule M where\nimport A\n";
        assert_restyle_matches_fresh("Haskell", text, 23, "{-");
        assert_restyle_matches_fresh("R", "x <- \"a\r\ny\n", 8, "}");
    }

    #[test]
    fn test_restyle_after_deleting_everything() {
        let config = Config::parse("[properties]\nfold = true").unwrap();
        let manager = SyntaxManager::with_config(config);
        let mut hl = manager.highlighter("Haskell").unwrap();
        let mut doc = TextBuffer::new("{- open\n");
        hl.ensure_styled_to(&mut doc, 8);
        assert_ne!(doc.line_state(0), 0);

        doc.delete(0, 8);
        hl.edit(0);
        hl.ensure_styled_to(&mut doc, 0);
        assert_eq!(doc.line_state(0), 0);
        assert_eq!(doc.level(0), FoldLevel::BASE);
        assert_eq!(hl.end_styled(), 0);
    }

    #[test]
    fn test_r_restyle_after_removing_last_line() {
        let manager = SyntaxManager::new();
        let mut hl = manager.highlighter("R").unwrap();
        let mut doc = TextBuffer::new("f <- {\nx\n");
        let len = doc.length();
        hl.ensure_styled_to(&mut doc, len);

        doc.delete(7, 9);
        hl.edit(7);
        let len = doc.length();
        hl.ensure_styled_to(&mut doc, len);

        let mut fresh = TextBuffer::new(&doc.text_range(0, len));
        manager.highlighter("R").unwrap().ensure_styled_to(&mut fresh, len);
        assert_eq!(doc.styles(), fresh.styles());
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.level(0), fresh.level(0));
        assert_eq!(doc.level(1), fresh.level(1));
        let last = FoldLevel::from_raw(doc.level(1));
        assert_eq!(last.level, FoldLevel::BASE + 1);
        assert!(last.white);
    }

    #[test]
    fn test_property_change_invalidates() {
        let manager = SyntaxManager::new();
        let mut hl = manager.highlighter("R").unwrap();
        let mut doc = TextBuffer::new("x\n");
        hl.ensure_styled_to(&mut doc, 2);
        assert_eq!(hl.end_styled(), 2);

        hl.set_property("fold.at.else", "0").unwrap();
        assert_eq!(hl.end_styled(), 2);
        hl.set_property("fold.at.else", "1").unwrap();
        assert_eq!(hl.end_styled(), 0);

        hl.ensure_styled_to(&mut doc, 2);
        hl.set_keywords(0, "x").unwrap();
        assert_eq!(hl.end_styled(), 0);
        hl.ensure_styled_to(&mut doc, 2);
        assert_eq!(doc.token_at(0), TokenType::Keyword);
        assert!(hl.set_keywords(7, "x").is_err());
    }
}
