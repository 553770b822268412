//! Error types for foldlex
//!
//! Lexing and folding never fail; these errors come from configuration,
//! property/word-list updates and the command line front end.

use thiserror::Error;

/// Result type alias for foldlex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Invalid value {value:?} for property {name}")]
    InvalidValue { name: String, value: String },

    #[error("No word list in slot {0}")]
    InvalidWordListSlot(usize),

    #[error("{0}")]
    Usage(String),
}
