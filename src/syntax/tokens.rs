//! Token types for syntax styling
//!
//! This module defines the style classifications assigned to spans of
//! source text, their stable numeric ids (stored per byte by the host)
//! and their default visual styles.

use super::style::{Color, Style};

/// Style classification for a span of text
///
/// One enumeration covers both grammars; each lexer uses a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TokenType {
    /// Plain text, whitespace and anything unrecognised
    #[default]
    Default = 0,
    /// Identifiers not found in any keyword list
    Identifier,
    /// Language keywords
    Keyword,
    /// Numeric literals
    Number,
    /// Double quoted strings
    String,
    /// Character literals
    Char,
    /// Operators and punctuation
    Operator,
    /// Capitalised names (constructors, types)
    Capital,
    /// Module names after `import` / `module`
    Module,
    /// Comments running to the end of the line
    CommentLine,
    /// Nested block comments
    CommentBlock,
    /// Compiler pragmas (`{-# ... #-}`)
    Pragma,
    /// Preprocessor directives
    Preprocessor,
    /// Base / default package functions
    BaseKeyword,
    /// Functions from other packages
    OtherKeyword,
    /// Single quoted strings
    String2,
    /// Backtick quoted names
    Backticks,
    /// Infix operators (`%in%`)
    Infix,
    /// Infix operator left open at the end of a line
    InfixEol,
    /// Raw strings with a double quote (`r"(...)"`)
    RawString,
    /// Raw strings with a single quote (`r'(...)'`)
    RawString2,
}

/// Every token type, in id order
pub const ALL_TOKENS: [TokenType; 21] = [
    TokenType::Default,
    TokenType::Identifier,
    TokenType::Keyword,
    TokenType::Number,
    TokenType::String,
    TokenType::Char,
    TokenType::Operator,
    TokenType::Capital,
    TokenType::Module,
    TokenType::CommentLine,
    TokenType::CommentBlock,
    TokenType::Pragma,
    TokenType::Preprocessor,
    TokenType::BaseKeyword,
    TokenType::OtherKeyword,
    TokenType::String2,
    TokenType::Backticks,
    TokenType::Infix,
    TokenType::InfixEol,
    TokenType::RawString,
    TokenType::RawString2,
];

impl TokenType {
    /// Stable id stored in the host's style array
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Token for a stored style id; unknown ids map to `Default`
    pub fn from_id(id: u8) -> Self {
        ALL_TOKENS
            .get(usize::from(id))
            .copied()
            .unwrap_or(TokenType::Default)
    }

    /// Whether this token is any kind of comment
    pub fn is_comment(self) -> bool {
        matches!(self, TokenType::CommentLine | TokenType::CommentBlock)
    }

    /// Get the default style for this token type
    pub fn default_style(&self) -> Style {
        match self {
            TokenType::CommentLine | TokenType::CommentBlock => {
                Style::fg(Color::BrightBlack).with_italic()
            }
            TokenType::String | TokenType::String2 => Style::fg(Color::Green),
            TokenType::RawString | TokenType::RawString2 => Style::fg(Color::BrightGreen),
            TokenType::Char => Style::fg(Color::Green),
            TokenType::Number => Style::fg(Color::Cyan),
            TokenType::Keyword => Style::fg(Color::Magenta).with_bold(),
            TokenType::BaseKeyword => Style::fg(Color::Blue),
            TokenType::OtherKeyword => Style::fg(Color::BrightBlue),
            TokenType::Capital => Style::fg(Color::Yellow),
            TokenType::Module => Style::fg(Color::BrightBlue),
            TokenType::Operator => Style::fg(Color::BrightWhite),
            TokenType::Pragma => Style::fg(Color::BrightCyan),
            TokenType::Preprocessor => Style::fg(Color::BrightMagenta),
            TokenType::Backticks => Style::fg(Color::BrightRed),
            TokenType::Infix => Style::fg(Color::BrightYellow),
            TokenType::InfixEol => Style::fg(Color::Red).with_underline(),
            TokenType::Identifier | TokenType::Default => Style::default(),
        }
    }

    /// Get a human-readable name for this token type
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::Default => "Default",
            TokenType::Identifier => "Identifier",
            TokenType::Keyword => "Keyword",
            TokenType::Number => "Number",
            TokenType::String => "String",
            TokenType::Char => "Char",
            TokenType::Operator => "Operator",
            TokenType::Capital => "Capital",
            TokenType::Module => "Module",
            TokenType::CommentLine => "CommentLine",
            TokenType::CommentBlock => "CommentBlock",
            TokenType::Pragma => "Pragma",
            TokenType::Preprocessor => "Preprocessor",
            TokenType::BaseKeyword => "BaseKeyword",
            TokenType::OtherKeyword => "OtherKeyword",
            TokenType::String2 => "String2",
            TokenType::Backticks => "Backticks",
            TokenType::Infix => "Infix",
            TokenType::InfixEol => "InfixEol",
            TokenType::RawString => "RawString",
            TokenType::RawString2 => "RawString2",
        }
    }

    /// Parse a token type from a string name
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_TOKENS.iter().copied().find(|t| t.name() == name)
    }
}
