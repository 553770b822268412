//! foldlex - incremental syntax styling and code folding
//!
//! Lexers style byte ranges of a host document and compute fold levels,
//! saving a small state per line so any line can be restyled without
//! starting from the top.

pub mod config;
pub mod error;
pub mod syntax;

pub use config::Config;
pub use error::{Error, Result};
