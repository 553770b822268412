//! R language lexer and brace folder

use tracing::trace;

use crate::error::{Error, Result};
use crate::syntax::chars::{any_of, is_alphanumeric, is_digit, is_hex_digit, is_space};
use crate::syntax::context::StyleContext;
use crate::syntax::document::Document;
use crate::syntax::fold::FoldLevel;
use crate::syntax::keywords::WordList;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::lexer::Lexer;
use crate::syntax::options::{OptionSet, PropertyType};
use crate::syntax::state::{RLineState, RawDelimiter};
use crate::syntax::tokens::TokenType;

const WORD_LISTS: &[&str] = &[
    "Language Keywords",
    "Base / Default package function",
    "Other Package Functions",
    "Unused",
    "Unused",
];

pub const KEYWORDS: &str = "if else repeat while function for in next break \
    TRUE FALSE NULL Inf NaN NA NA_integer_ NA_real_ NA_character_ NA_complex_";

pub const BASE_FUNCTIONS: &str = "abs all any apply c cat character data.frame exists \
    factor function invisible is.na lapply length library list matrix max mean min \
    names nchar numeric paste paste0 print rep require return sapply seq seq_along \
    stop sum switch unlist vector warning";

pub const OTHER_FUNCTIONS: &str = "aes filter ggplot mutate select summarise";

/// Create R language definition
pub fn r_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("R", || Box::new(RLexer::new()));
    lang.add_extension("r");
    lang.add_extension("R");
    lang.add_extension("Rprofile");
    lang.set_first_line(r"^#!.*\bRscript\b");
    lang.add_keywords(0, KEYWORDS);
    lang.add_keywords(1, BASE_FUNCTIONS);
    lang.add_keywords(2, OTHER_FUNCTIONS);
    lang
}

fn is_word_char(ch: u32) -> bool {
    is_alphanumeric(ch) || any_of(ch, b"._")
}

fn is_word_start(ch: u32) -> bool {
    is_alphanumeric(ch) || any_of(ch, b"_")
}

/// `.` is left out as it makes up numbers
fn is_operator(ch: u32) -> bool {
    any_of(ch, b"-+!~?:*/^<>=&|$(){}[]")
}

/// Pre-scan a raw string opening after `r"`: dashes, then a bracket
fn check_raw_string<D: Document + ?Sized>(doc: &D, mut pos: usize) -> Option<RawDelimiter> {
    let mut dashes = 0;
    loop {
        let close = match doc.byte_at(pos) {
            b'-' => {
                dashes += 1;
                pos += 1;
                continue;
            }
            b'(' => b')',
            b'[' => b']',
            b'{' => b'}',
            _ => return None,
        };
        return Some(RawDelimiter { close, dashes });
    }
}

#[derive(Debug, Clone)]
struct ROptions {
    fold_compact: bool,
    fold_at_else: bool,
}

impl Default for ROptions {
    fn default() -> Self {
        Self {
            fold_compact: true,
            fold_at_else: false,
        }
    }
}

fn option_set() -> OptionSet<ROptions> {
    OptionSet::<ROptions>::new(WORD_LISTS)
        .boolean(
            "fold.compact",
            |o| &mut o.fold_compact,
            "Set to 0 to keep trailing blank lines out of the white-line state",
        )
        .boolean(
            "fold.at.else",
            |o| &mut o.fold_at_else,
            "Set to 1 to fold on the else line of \"} else {\" blocks",
        )
}

/// Lexer for R, S and S-PLUS
pub struct RLexer {
    keywords: WordList,
    base_functions: WordList,
    other_functions: WordList,
    options: ROptions,
    option_set: OptionSet<ROptions>,
}

impl RLexer {
    pub fn new() -> Self {
        Self {
            keywords: WordList::new(),
            base_functions: WordList::new(),
            other_functions: WordList::new(),
            options: ROptions::default(),
            option_set: option_set(),
        }
    }

    fn classify(&self, word: &str) -> TokenType {
        if self.keywords.in_list(word) {
            TokenType::Keyword
        } else if self.base_functions.in_list(word) {
            TokenType::BaseKeyword
        } else if self.other_functions.in_list(word) {
            TokenType::OtherKeyword
        } else {
            TokenType::Identifier
        }
    }
}

impl Default for RLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer for RLexer {
    fn name(&self) -> &'static str {
        "R"
    }

    fn property_names(&self) -> Vec<&'static str> {
        self.option_set.property_names()
    }

    fn property_type(&self, name: &str) -> Option<PropertyType> {
        self.option_set.property_type(name)
    }

    fn describe_property(&self, name: &str) -> Option<&'static str> {
        self.option_set.describe_property(name)
    }

    fn property_set(&mut self, name: &str, value: &str) -> Result<bool> {
        self.option_set.property_set(&mut self.options, name, value)
    }

    fn describe_word_lists(&self) -> &'static [&'static str] {
        self.option_set.word_lists()
    }

    fn word_list_set(&mut self, slot: usize, words: &str) -> Result<bool> {
        match slot {
            0 => Ok(self.keywords.set(words)),
            1 => Ok(self.base_functions.set(words)),
            2 => Ok(self.other_functions.set(words)),
            3 | 4 => Ok(false),
            _ => Err(Error::InvalidWordListSlot(slot)),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(start = start, length = length))]
    fn lex(&mut self, doc: &mut dyn Document, start: usize, length: usize, init_style: TokenType) {
        // An infix left open at a line end does not leak onto the next line
        let init_style = match init_style {
            TokenType::InfixEol => TokenType::Default,
            other => other,
        };

        let mut sc = StyleContext::new(doc, start, length, init_style);
        let mut raw = if sc.current_line > 0 {
            RLineState::from_raw(sc.document().line_state(sc.current_line - 1)).raw
        } else {
            None
        };
        trace!(line = sc.current_line, ?init_style, ?raw, "resuming");

        while sc.more() {
            // Determine if the current state should terminate
            match sc.state() {
                TokenType::Operator => sc.set_state(TokenType::Default),
                TokenType::Number => {
                    if any_of(sc.ch, b"eEpP")
                        && (is_digit(sc.ch_next) || sc.next_is(b'+') || sc.next_is(b'-'))
                    {
                        // Exponent part
                        sc.forward();
                    } else if !(is_hex_digit(sc.ch) || (sc.is(b'.') && is_digit(sc.ch_next))) {
                        if any_of(sc.ch, b"Li") {
                            // Integer and complex qualifiers
                            sc.forward();
                        }
                        sc.set_state(TokenType::Default);
                    }
                }
                TokenType::Identifier => {
                    if !is_word_char(sc.ch) {
                        let token = self.classify(&sc.current_text());
                        sc.change_state(token);
                        sc.set_state(TokenType::Default);
                    }
                }
                TokenType::CommentLine => {
                    if sc.match_line_end() {
                        sc.set_state(TokenType::Default);
                    }
                }
                state @ (TokenType::String | TokenType::String2 | TokenType::Backticks) => {
                    let quote = match state {
                        TokenType::String => b'"',
                        TokenType::String2 => b'\'',
                        _ => b'`',
                    };
                    if sc.is(b'\\') {
                        if any_of(sc.ch_next, b"\"'\\`") {
                            sc.forward();
                        }
                    } else if sc.is(quote) {
                        sc.forward_set_state(TokenType::Default);
                    }
                }
                state @ (TokenType::RawString | TokenType::RawString2) => {
                    let quote = if state == TokenType::RawString {
                        b'"'
                    } else {
                        b'\''
                    };
                    if let Some(delim) = raw {
                        while sc.is(delim.close) {
                            sc.forward();
                            let mut count = delim.dashes;
                            while count != 0 && sc.is(b'-') {
                                count -= 1;
                                sc.forward();
                            }
                            if count == 0 && sc.is(quote) {
                                raw = None;
                                sc.forward_set_state(TokenType::Default);
                                break;
                            }
                        }
                    }
                }
                TokenType::Infix => {
                    if sc.is(b'%') {
                        sc.forward_set_state(TokenType::Default);
                    } else if sc.at_line_end {
                        // Moving past the line end skips the state write below
                        let line = sc.current_line;
                        sc.document_mut()
                            .set_line_state(line, RLineState { raw }.to_raw());
                        sc.change_state(TokenType::InfixEol);
                        sc.forward_set_state(TokenType::Default);
                    }
                }
                _ => {}
            }

            // Determine if a new state should be entered
            if sc.state() == TokenType::Default {
                if is_digit(sc.ch) || (sc.is(b'.') && is_digit(sc.ch_next)) {
                    sc.set_state(TokenType::Number);
                    if sc.is(b'0') && any_of(sc.ch_next, b"xX") {
                        sc.forward();
                    }
                } else if any_of(sc.ch, b"rR") && any_of(sc.ch_next, b"\"'") {
                    let double = sc.next_is(b'"');
                    raw = check_raw_string(sc.document(), sc.current_pos + 2);
                    match raw {
                        Some(delim) => {
                            sc.set_state(if double {
                                TokenType::RawString
                            } else {
                                TokenType::RawString2
                            });
                            sc.forward_by(delim.dashes as usize + 2);
                        }
                        None => {
                            // No delimiter: a stray identifier before a plain string
                            sc.set_state(TokenType::Identifier);
                            sc.forward_set_state(if double {
                                TokenType::String
                            } else {
                                TokenType::String2
                            });
                        }
                    }
                } else if is_word_start(sc.ch) {
                    sc.set_state(TokenType::Identifier);
                } else if sc.is(b'#') {
                    sc.set_state(TokenType::CommentLine);
                } else if sc.is(b'"') {
                    sc.set_state(TokenType::String);
                } else if sc.is(b'%') {
                    sc.set_state(TokenType::Infix);
                } else if sc.is(b'\'') {
                    sc.set_state(TokenType::String2);
                } else if sc.is(b'`') {
                    sc.set_state(TokenType::Backticks);
                } else if is_operator(sc.ch) {
                    sc.set_state(TokenType::Operator);
                }
            }

            if sc.at_line_end {
                let line = sc.current_line;
                sc.document_mut()
                    .set_line_state(line, RLineState { raw }.to_raw());
            }
            sc.forward();
        }
        sc.complete();
    }

    /// Brace folding: both the line's level and the next line's level
    /// are stored so `} else {` can use the minimum level on the line
    #[tracing::instrument(level = "debug", skip_all, fields(start = start, length = length))]
    fn fold(&mut self, doc: &mut dyn Document, start: usize, length: usize, _init_style: TokenType) {
        let fold_compact = self.options.fold_compact;
        let fold_at_else = self.options.fold_at_else;
        let end = start + length;
        let mut line_current = doc.line_from_position(start);
        let mut level_current = if line_current > 0 {
            FoldLevel::from_raw(doc.level(line_current - 1)).next
        } else {
            FoldLevel::BASE
        };
        let mut level_min_current = level_current;
        let mut level_next = level_current;
        let mut visible_chars = 0;
        let mut ch_next = doc.byte_at(start);
        let mut style_next = doc.style_at(start);

        for i in start..end {
            let ch = ch_next;
            ch_next = doc.byte_at(i + 1);
            let style = style_next;
            style_next = doc.style_at(i + 1);
            let at_eol = (ch == b'\r' && ch_next != b'\n') || ch == b'\n';

            if style == TokenType::Operator.id() {
                if ch == b'{' {
                    // Measure the minimum before a '{' to allow folding on "} else {"
                    level_min_current = level_min_current.min(level_next);
                    level_next += 1;
                } else if ch == b'}' {
                    level_next -= 1;
                }
            }

            if at_eol {
                let level_use = if fold_at_else {
                    level_min_current
                } else {
                    level_current
                };
                let white = visible_chars == 0 && fold_compact;
                set_line_level(doc, line_current, level_use, level_next, white);
                line_current += 1;
                level_current = level_next;
                level_min_current = level_current;
                visible_chars = 0;
            }
            if !is_space(u32::from(ch)) {
                visible_chars += 1;
            }
        }

        // The last line has no terminator to trigger the write above
        if end >= doc.length() && line_current < doc.line_count() {
            let level_use = if fold_at_else {
                level_min_current
            } else {
                level_current
            };
            let white = visible_chars == 0 && fold_compact;
            set_line_level(doc, line_current, level_use, level_next, white);
        }
    }
}

fn set_line_level(doc: &mut dyn Document, line: usize, level: i32, next: i32, white: bool) {
    let level = FoldLevel {
        level,
        next,
        white,
        header: level < next,
    };
    if level.to_raw() != doc.level(line) {
        doc.set_level(line, level.to_raw());
    }
}
