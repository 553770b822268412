//! Helpers shared by the lexer tests

use super::document::{Document, TextBuffer};
use super::lexer::Lexer;
use super::tokens::TokenType;

/// Lex all of `text` from the default state
pub fn lex_all(lexer: &mut dyn Lexer, text: &str) -> TextBuffer {
    let mut doc = TextBuffer::new(text);
    let len = doc.length();
    lexer.lex(&mut doc, 0, len, TokenType::Default);
    doc
}

/// Lex `[start, start + length)` of an existing buffer
pub fn lex_range(
    lexer: &mut dyn Lexer,
    doc: &mut TextBuffer,
    start: usize,
    length: usize,
    init_style: TokenType,
) {
    lexer.lex(doc, start, length, init_style);
}

/// Runs of equally styled text over the whole buffer
pub fn runs(doc: &TextBuffer) -> Vec<(String, TokenType)> {
    doc.style_runs()
        .into_iter()
        .map(|span| (doc.text_range(span.start, span.end), span.token))
        .collect()
}
