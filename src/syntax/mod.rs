//! Syntax and styling module
//!
//! This module provides the lexing and folding engine:
//! - A cursor over the host document ([`StyleContext`])
//! - Per-line lexer state carried between calls
//! - Haskell and R lexers with their folders
//! - Language detection and incremental restyling ([`SyntaxManager`])

pub mod builtin;
mod chars;
mod context;
mod document;
mod fold;
mod keywords;
mod language;
mod lexer;
mod manager;
mod options;
mod state;
mod style;
mod tokens;

#[cfg(test)]
mod testing;

pub use context::{StyleContext, MAX_WORD_LEN};
pub use document::{Document, Encoding, TextBuffer};
pub use fold::{indent_amount, FoldLevel};
pub use keywords::WordList;
pub use language::LanguageDefinition;
pub use lexer::Lexer;
pub use manager::{Highlighter, SyntaxManager};
pub use options::{parse_bool, OptionSet, PropertyType};
pub use state::{HaskellLineState, HaskellMode, RLineState, RawDelimiter};
pub use style::{Color, Span, Style};
pub use tokens::{TokenType, ALL_TOKENS};
