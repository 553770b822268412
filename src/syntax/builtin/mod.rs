//! Built-in languages
//!
//! Each language module provides its lexer and a definition tying it to
//! file extensions and default keyword lists.

pub mod haskell;
pub mod r;

use super::language::LanguageDefinition;

/// Get all built-in language definitions
pub fn all_languages() -> Vec<LanguageDefinition> {
    vec![haskell::haskell_language(), r::r_language()]
}
