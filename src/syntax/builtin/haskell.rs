//! Haskell language lexer and indentation folder
//!
//! Besides the usual literals and comments the lexer follows a small
//! amount of declaration context (`import`, `module`, `foreign`, `type`)
//! so module names and context keywords such as `qualified`, `as` and
//! `hiding` are styled only where they have meaning. That context and
//! the block comment depth are persisted per line.

use tracing::trace;

use crate::error::{Error, Result};
use crate::syntax::chars::{any_of, is_alphanumeric, is_digit, is_digit_in_base, is_lower, is_upper};
use crate::syntax::context::StyleContext;
use crate::syntax::document::Document;
use crate::syntax::fold::{indent_amount, FoldLevel};
use crate::syntax::keywords::WordList;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::lexer::Lexer;
use crate::syntax::options::{OptionSet, PropertyType};
use crate::syntax::state::{HaskellLineState, HaskellMode};
use crate::syntax::tokens::TokenType;

const WORD_LISTS: &[&str] = &["Keywords", "FFI"];

pub const KEYWORDS: &str = "case class data default deriving do else foreign if import in \
    infix infixl infixr instance let module newtype of then type where forall mdo rec proc";

pub const FFI_KEYWORDS: &str = "import export safe unsafe ccall stdcall capi cplusplus \
    jvm dotnet interruptible javascript";

/// Create Haskell language definition
pub fn haskell_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("Haskell", || Box::new(HaskellLexer::new()));
    lang.add_extension("hs");
    lang.add_extension("lhs");
    lang.add_extension("hsc");
    lang.set_first_line(r"^#!.*\b(runhaskell|runghc|stack)\b");
    lang.add_keywords(0, KEYWORDS);
    lang.add_keywords(1, FFI_KEYWORDS);
    lang
}

fn is_word_start(ch: u32) -> bool {
    is_lower(ch) || is_upper(ch) || any_of(ch, b"_")
}

fn is_word_char(ch: u32) -> bool {
    is_alphanumeric(ch) || any_of(ch, b"_'")
}

fn is_operator_char(ch: u32) -> bool {
    any_of(ch, b"!#$%&*+-./:<=>?@^|~\\")
}

#[derive(Debug, Clone)]
struct HaskellOptions {
    magic_hash: bool,
    allow_quotes: bool,
    highlight_safe: bool,
    styling_within_preprocessor: bool,
    fold: bool,
    fold_compact: bool,
    fold_imports: bool,
}

impl Default for HaskellOptions {
    fn default() -> Self {
        Self {
            magic_hash: true,
            allow_quotes: true,
            highlight_safe: true,
            styling_within_preprocessor: false,
            fold: false,
            fold_compact: false,
            fold_imports: false,
        }
    }
}

fn option_set() -> OptionSet<HaskellOptions> {
    OptionSet::<HaskellOptions>::new(WORD_LISTS)
        .boolean(
            "lexer.haskell.allow.hash",
            |o| &mut o.magic_hash,
            "Set to 1 to allow the '#' character at the end of identifiers and \
             literals (GHC MagicHash extension)",
        )
        .boolean(
            "lexer.haskell.allow.quotes",
            |o| &mut o.allow_quotes,
            "Set to 1 to enable highlighting of Template Haskell name quotations \
             and promoted constructors (GHC TemplateHaskell and DataKinds extensions)",
        )
        .boolean(
            "lexer.haskell.import.safe",
            |o| &mut o.highlight_safe,
            "Set to 1 to allow keyword \"safe\" in imports (GHC SafeHaskell extension)",
        )
        .boolean(
            "styling.within.preprocessor",
            |o| &mut o.styling_within_preprocessor,
            "Determines whether all preprocessor code is styled in the preprocessor \
             style (0, the default) or only from the initial # to the end of the \
             command word (1)",
        )
        .boolean("fold", |o| &mut o.fold, "Set to 1 to enable folding")
        .boolean(
            "fold.compact",
            |o| &mut o.fold_compact,
            "Set to 1 to keep blank lines flagged white inside folds",
        )
        .boolean(
            "fold.haskell.imports",
            |o| &mut o.fold_imports,
            "Set to 1 to enable folding of import declarations",
        )
}

/// Lexer for Haskell
pub struct HaskellLexer {
    /// First line of the import block seen by the folder
    first_import_line: Option<usize>,
    keywords: WordList,
    ffi: WordList,
    options: HaskellOptions,
    option_set: OptionSet<HaskellOptions>,
}

impl HaskellLexer {
    pub fn new() -> Self {
        Self {
            first_import_line: None,
            keywords: WordList::new(),
            ffi: WordList::new(),
            options: HaskellOptions::default(),
            option_set: option_set(),
        }
    }

    fn skip_magic_hash<D: Document + ?Sized>(&self, sc: &mut StyleContext<'_, D>, two_hashes: bool) {
        if self.options.magic_hash && sc.is(b'#') {
            sc.forward();
            if two_hashes && sc.is(b'#') {
                sc.forward();
            }
        }
    }

    fn line_contains_import<D: Document + ?Sized>(&self, doc: &D, line: usize) -> bool {
        if !self.options.fold_imports {
            return false;
        }
        let start = doc.line_start(line);
        b"import"
            .iter()
            .enumerate()
            .all(|(i, &b)| doc.byte_at(start + i) == b)
    }

    /// Scan the rest of an identifier starting at `sc.ch`, returning the
    /// style the scan itself implies
    fn scan_identifier<D: Document + ?Sized>(&self, sc: &mut StyleContext<'_, D>) -> TokenType {
        let mut style = if is_upper(sc.ch) {
            TokenType::Capital
        } else {
            TokenType::Identifier
        };
        sc.forward();

        while sc.more() {
            if is_word_char(sc.ch) {
                sc.forward();
            } else if sc.is(b'#') && self.options.magic_hash {
                sc.forward();
                break;
            } else if style == TokenType::Capital && sc.is(b'.') {
                // Qualified name: Module.Name, Module.name or Module.+
                if is_upper(sc.ch_next) {
                    sc.forward();
                    style = TokenType::Capital;
                } else if is_word_start(sc.ch_next) {
                    sc.forward();
                    style = TokenType::Identifier;
                } else if is_operator_char(sc.ch_next) {
                    sc.forward();
                    style = if sc.is(b':') {
                        TokenType::Capital
                    } else {
                        TokenType::Operator
                    };
                    while is_operator_char(sc.ch) {
                        sc.forward();
                    }
                    break;
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        style
    }

    /// Final style of a scanned word and the mode that follows it
    fn classify(&self, word: &str, scanned: TokenType, mode: HaskellMode) -> (TokenType, HaskellMode) {
        let mut style = scanned;
        let mut new_mode = HaskellMode::Default;
        let capitalised = word.bytes().next().is_some_and(|b| b.is_ascii_uppercase());

        if self.keywords.in_list(word) {
            style = TokenType::Keyword;
        } else if capitalised {
            match mode {
                HaskellMode::Import1 | HaskellMode::Import3 => {
                    style = TokenType::Module;
                    new_mode = HaskellMode::Import2;
                }
                HaskellMode::Module => style = TokenType::Module,
                _ => {}
            }
        } else if mode == HaskellMode::Import1 && word == "qualified" {
            style = TokenType::Keyword;
            new_mode = HaskellMode::Import1;
        } else if self.options.highlight_safe && mode == HaskellMode::Import1 && word == "safe" {
            style = TokenType::Keyword;
            new_mode = HaskellMode::Import1;
        } else if mode == HaskellMode::Import2 {
            if word == "as" {
                style = TokenType::Keyword;
                new_mode = HaskellMode::Import3;
            } else if word == "hiding" {
                style = TokenType::Keyword;
            }
        } else if mode == HaskellMode::Type && word == "family" {
            style = TokenType::Keyword;
        }

        if mode == HaskellMode::Ffi && self.ffi.in_list(word) {
            style = TokenType::Keyword;
            new_mode = HaskellMode::Ffi;
        }

        new_mode = match word {
            "import" if mode != HaskellMode::Ffi => HaskellMode::Import1,
            "module" => HaskellMode::Module,
            "foreign" => HaskellMode::Ffi,
            "type" | "data" => HaskellMode::Type,
            _ => new_mode,
        };
        (style, new_mode)
    }
}

impl Default for HaskellLexer {
    fn default() -> Self {
        Self::new()
    }
}

fn save_line_state<D: Document + ?Sized>(sc: &mut StyleContext<'_, D>, mode: HaskellMode, nest_depth: u32) {
    let line = sc.current_line;
    let state = HaskellLineState { mode, nest_depth };
    sc.document_mut().set_line_state(line, state.to_raw());
}

/// Whether a line holds nothing but whitespace before a comment or
/// preprocessor directive (blank lines count)
fn line_starts_with_comment_or_preprocessor<D: Document + ?Sized>(doc: &D, line: usize) -> bool {
    let pos = doc.line_start(line);
    let eol = doc.line_start(line + 1).saturating_sub(1);
    for i in pos..eol {
        let style = TokenType::from_id(doc.style_at(i));
        if style.is_comment() || style == TokenType::Preprocessor {
            return true;
        }
        if !matches!(doc.byte_at(i), b' ' | b'\t') {
            return false;
        }
    }
    true
}

impl Lexer for HaskellLexer {
    fn name(&self) -> &'static str {
        "Haskell"
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
            1 => Ok(self.ffi.set(words)),
            _ => Err(Error::InvalidWordListSlot(slot)),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(start = start, length = length))]
    fn lex(&mut self, doc: &mut dyn Document, start: usize, length: usize, init_style: TokenType) {
        let mut sc = StyleContext::new(doc, start, length, init_style);

        let saved = if sc.current_line > 0 {
            HaskellLineState::from_raw(sc.document().line_state(sc.current_line - 1))
        } else {
            HaskellLineState::default()
        };
        let mut mode = saved.mode;
        let mut nest_level = saved.nest_depth;
        trace!(line = sc.current_line, ?init_style, ?saved, "resuming");

        let mut base = 10;
        let mut in_dashes = false;

        while sc.more() {
            // States either forward one character at a time or never skip
            // a line end, so every line end is seen here.
            if sc.at_line_end {
                save_line_state(&mut sc, mode, nest_level);
            }

            // Line continuation: a backslash directly before the line end
            // keeps strings and directives open
            if sc.is(b'\\')
                && matches!(sc.state(), TokenType::String | TokenType::Preprocessor)
                && (sc.next_is(b'\n') || sc.next_is(b'\r'))
            {
                save_line_state(&mut sc, mode, nest_level);
                sc.forward();
                if sc.is(b'\r') && sc.next_is(b'\n') {
                    sc.forward();
                }
                sc.forward();
                continue;
            }

            match sc.state() {
                TokenType::Operator => {
                    // `:` starts a constructor operator, except a lone `::`
                    let style = if sc.is(b':')
                        && !(sc.next_is(b':') && !is_operator_char(sc.get_relative(2)))
                    {
                        TokenType::Capital
                    } else {
                        TokenType::Operator
                    };
                    while is_operator_char(sc.ch) {
                        sc.forward();
                    }
                    let end = sc.current_pos;
                    sc.colour_to(end, style);
                    sc.change_state(TokenType::Default);
                }
                state @ (TokenType::String | TokenType::Char) => {
                    let quote = if state == TokenType::String { b'"' } else { b'\'' };
                    if sc.is(quote) {
                        sc.forward();
                        self.skip_magic_hash(&mut sc, false);
                        sc.set_state(TokenType::Default);
                    } else if sc.is(b'\\') {
                        sc.forward();
                        if sc.at_line_end {
                            save_line_state(&mut sc, mode, nest_level);
                        }
                        sc.forward();
                    } else if sc.at_line_end {
                        sc.set_state(TokenType::Default);
                        sc.forward();
                    } else {
                        sc.forward();
                    }
                }
                TokenType::Number => {
                    if is_digit_in_base(sc.ch, base)
                        || (sc.is(b'.') && is_digit_in_base(sc.ch_next, base))
                    {
                        sc.forward();
                    } else if base == 10
                        && any_of(sc.ch, b"eE")
                        && (is_digit(sc.ch_next) || any_of(sc.ch_next, b"+-"))
                    {
                        sc.forward();
                        if any_of(sc.ch, b"+-") {
                            sc.forward();
                        }
                    } else {
                        self.skip_magic_hash(&mut sc, true);
                        sc.set_state(TokenType::Default);
                    }
                }
                TokenType::Identifier => {
                    let scanned = self.scan_identifier(&mut sc);
                    let word = sc.current_text();
                    let (style, new_mode) = self.classify(&word, scanned, mode);
                    let end = sc.current_pos;
                    sc.colour_to(end, style);
                    sc.change_state(TokenType::Default);
                    mode = new_mode;
                }
                TokenType::CommentLine => {
                    if in_dashes && !sc.is(b'-') {
                        in_dashes = false;
                        // `-->` and friends are operators, not comments
                        if is_operator_char(sc.ch) {
                            sc.change_state(TokenType::Operator);
                        }
                    } else if sc.at_line_end {
                        sc.set_state(TokenType::Default);
                        sc.forward();
                    } else {
                        sc.forward();
                    }
                }
                TokenType::CommentBlock => {
                    if sc.matches_pair(b'{', b'-') {
                        sc.forward_by(2);
                        nest_level += 1;
                    } else if sc.matches_pair(b'-', b'}') {
                        sc.forward_by(2);
                        nest_level = nest_level.saturating_sub(1);
                        if nest_level == 0 {
                            sc.set_state(TokenType::Default);
                        }
                    } else {
                        sc.forward();
                    }
                }
                TokenType::Pragma => {
                    // A pragma end is always indented further than its start
                    if sc.matches_str("#-}") && !sc.at_line_start {
                        sc.forward_by(3);
                        sc.set_state(TokenType::Default);
                    } else {
                        sc.forward();
                    }
                }
                TokenType::Preprocessor => {
                    if self.options.styling_within_preprocessor && !is_word_start(sc.ch) {
                        sc.set_state(TokenType::Default);
                    } else if sc.at_line_end {
                        sc.set_state(TokenType::Default);
                        sc.forward();
                    } else {
                        sc.forward();
                    }
                }
                _ => {
                    // Default, or a style this lexer never starts
                    if sc.state() != TokenType::Default {
                        sc.set_state(TokenType::Default);
                    }
                    if is_digit(sc.ch) {
                        sc.set_state(TokenType::Number);
                        if sc.is(b'0') && any_of(sc.ch_next, b"xX") {
                            sc.forward_by(2);
                            base = 16;
                        } else if sc.is(b'0') && any_of(sc.ch_next, b"oO") {
                            sc.forward_by(2);
                            base = 8;
                        } else {
                            sc.forward();
                            base = 10;
                        }
                        mode = HaskellMode::Default;
                    } else if sc.matches_str("{-#") {
                        sc.set_state(TokenType::Pragma);
                        sc.forward_by(3);
                    } else if sc.matches_pair(b'-', b'-') {
                        sc.set_state(TokenType::CommentLine);
                        sc.forward_by(2);
                        in_dashes = true;
                    } else if sc.matches_pair(b'{', b'-') {
                        sc.set_state(TokenType::CommentBlock);
                        sc.forward_by(2);
                        nest_level += 1;
                    } else if sc.is(b'"') {
                        sc.set_state(TokenType::String);
                        sc.forward();
                    } else if sc.is(b'\'') {
                        // Character literal or quoted name
                        sc.set_state(TokenType::Char);
                        sc.forward();

                        let mut style = TokenType::Char;
                        if self.options.allow_quotes {
                            if sc.is(b'\'') && is_word_start(sc.ch_next) {
                                // Quoted type ''T
                                sc.forward();
                                style = TokenType::Identifier;
                            } else if !sc.next_is(b'\'') {
                                if is_word_start(sc.ch) {
                                    // Quoted value or promoted constructor 'N
                                    style = TokenType::Identifier;
                                } else if sc.is(b':') {
                                    // Promoted constructor operator ':~>
                                    style = TokenType::Operator;
                                } else if sc.is(b'[') || sc.is(b'(') {
                                    // Promoted list or tuple '[T]
                                    let end = sc.current_pos;
                                    sc.colour_to(end, TokenType::Operator);
                                    style = TokenType::Default;
                                }
                            }
                        }
                        sc.change_state(style);
                    } else if sc.at_line_start && sc.is(b'#') && mode != HaskellMode::Ffi {
                        mode = HaskellMode::Default;
                        sc.set_state(TokenType::Preprocessor);
                        sc.forward();
                    } else if is_operator_char(sc.ch) {
                        mode = HaskellMode::Default;
                        sc.set_state(TokenType::Operator);
                    } else if any_of(sc.ch, b",;()[]{}") {
                        sc.set_state(TokenType::Operator);
                        sc.forward();
                        sc.set_state(TokenType::Default);
                    } else if is_word_start(sc.ch) {
                        sc.set_state(TokenType::Identifier);
                    } else {
                        sc.forward();
                    }
                }
            }
        }
        sc.complete();
    }

    /// Indentation folding; comments, blank lines and preprocessor lines
    /// fold with the surrounding code
    #[tracing::instrument(level = "debug", skip_all, fields(start = start, length = length))]
    fn fold(&mut self, doc: &mut dyn Document, start: usize, length: usize, _init_style: TokenType) {
        if !self.options.fold {
            return;
        }
        let compact = self.options.fold_compact;
        let max_pos = start + length;
        let max_lines = if max_pos == doc.length() {
            doc.line_from_position(max_pos)
        } else {
            doc.line_from_position(max_pos.saturating_sub(1))
        };
        let doc_lines = doc.line_from_position(doc.length());

        // Back up to a line with real code so blank lines and the level
        // of the preceding line can be fixed up
        let mut line_current = doc.line_from_position(start);
        let mut import_current = self.line_contains_import(doc, line_current);
        let mut indent_current = indent_amount(doc, line_current);
        while line_current > 0 {
            line_current -= 1;
            import_current = self.line_contains_import(doc, line_current);
            indent_current = indent_amount(doc, line_current);
            if !indent_current.white && !line_starts_with_comment_or_preprocessor(doc, line_current) {
                break;
            }
        }

        if self.first_import_line.is_some_and(|first| line_current <= first) {
            trace!(line = line_current, "forgetting first import line");
            self.first_import_line = None;
        }
        if import_current && *self.first_import_line.get_or_insert(line_current) != line_current {
            indent_current.level += 1;
        }
        let mut indent_current_level = indent_current.level;

        while line_current <= doc_lines && line_current <= max_lines {
            let mut line_next = line_current + 1;
            let mut import_next = self.line_contains_import(doc, line_next);
            let mut indent_next = indent_current;
            if line_next <= doc_lines {
                indent_next = indent_amount(doc, line_next);
            }
            if indent_next.white {
                indent_next = FoldLevel {
                    white: true,
                    ..FoldLevel::new(indent_current_level)
                };
            }

            // Skip blank and comment lines for the next indent level
            while line_next < doc_lines
                && (indent_next.white || line_starts_with_comment_or_preprocessor(doc, line_next))
            {
                line_next += 1;
                import_next = self.line_contains_import(doc, line_next);
                indent_next = indent_amount(doc, line_next);
            }

            if import_next && *self.first_import_line.get_or_insert(line_next) != line_next {
                indent_next.level += 1;
            }
            let indent_next_level = indent_next.level;
            let level_before_comments = indent_current_level.max(indent_next_level);

            // Set the levels of the skipped lines from the end backwards.
            // Once a line is indented deeper than the line after the
            // comment block, it belongs to the block before.
            let mut skip_line = line_next;
            let mut skip_level = indent_next_level;
            while skip_line > line_current + 1 {
                skip_line -= 1;
                let skip_indent = indent_amount(doc, skip_line);
                let level = if compact {
                    if skip_indent.level > indent_next_level {
                        skip_level = level_before_comments;
                    }
                    FoldLevel {
                        white: skip_indent.white,
                        ..FoldLevel::new(skip_level)
                    }
                } else {
                    if skip_indent.level > indent_next_level
                        && !skip_indent.white
                        && !line_starts_with_comment_or_preprocessor(doc, skip_line)
                    {
                        skip_level = level_before_comments;
                    }
                    FoldLevel::new(skip_level)
                };
                doc.set_level(skip_line, level.to_raw());
            }

            let mut level = indent_current;
            if !indent_current.white && indent_current.level < indent_next.level {
                level.header = true;
            }
            if !compact {
                level.white = false;
            }
            doc.set_level(line_current, level.to_raw());

            indent_current = indent_next;
            indent_current_level = indent_next_level;
            line_current = line_next;
        }
    }
}
