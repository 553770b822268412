//! Configuration file support
//!
//! Loads lexer settings from ~/.foldlex.toml (or %USERPROFILE%\.foldlex.toml
//! on Windows). `FOLDLEX_CONFIG` names a different file.
//!
//! Example:
//! ```text
//! # Applied to every lexer that declares the property
//! [properties]
//! "fold.compact" = false
//!
//! [languages.haskell.properties]
//! fold = true
//! "fold.haskell.imports" = true
//!
//! # Word list slots, replacing the built-in lists
//! [languages.r.keywords]
//! 2 = "ggplot aes geom_point"
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::syntax::Lexer;

/// Settings for one language
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageConfig {
    /// Property values
    pub properties: Vec<(String, String)>,
    /// Word lists by slot
    pub keywords: Vec<(usize, String)>,
}

/// Configuration settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Properties for every lexer that declares them
    pub properties: Vec<(String, String)>,
    /// Per-language settings, keyed by lowercase language name
    pub languages: HashMap<String, LanguageConfig>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os("FOLDLEX_CONFIG") {
            return Some(PathBuf::from(path));
        }

        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".foldlex.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".foldlex.toml"))
        }
    }

    /// Load configuration from the config file; a missing file means defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                debug!(path = %path.display(), "loading configuration");
                Self::parse(&contents)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let table: Table = contents.parse()?;
        let mut config = Config::default();

        if let Some(properties) = table.get("properties") {
            config.properties = parse_properties("properties", properties)?;
        }

        if let Some(languages) = table.get("languages") {
            let languages = as_table("languages", languages)?;
            for (name, settings) in languages {
                let settings = as_table(name, settings)?;
                let mut language = LanguageConfig::default();
                if let Some(properties) = settings.get("properties") {
                    language.properties = parse_properties(name, properties)?;
                }
                if let Some(keywords) = settings.get("keywords") {
                    language.keywords = parse_keywords(name, keywords)?;
                }
                config.languages.insert(name.to_lowercase(), language);
            }
        }

        Ok(config)
    }

    /// Apply the settings for `lexer`'s language
    ///
    /// Global properties the lexer does not declare are skipped; unknown
    /// per-language properties and bad values are errors.
    pub fn apply_to(&self, lexer: &mut dyn Lexer) -> Result<()> {
        for (key, value) in &self.properties {
            if lexer.property_type(key).is_some() {
                lexer.property_set(key, value)?;
            }
        }

        if let Some(language) = self.languages.get(&lexer.name().to_lowercase()) {
            for (key, value) in &language.properties {
                lexer.property_set(key, value)?;
            }
            for (slot, words) in &language.keywords {
                lexer.word_list_set(*slot, words)?;
            }
        }
        Ok(())
    }
}

fn as_table<'a>(name: &str, value: &'a Value) -> Result<&'a Table> {
    value.as_table().ok_or_else(|| Error::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Flatten a property table to strings the lexers parse
fn parse_properties(section: &str, value: &Value) -> Result<Vec<(String, String)>> {
    let mut properties = Vec::new();
    for (key, value) in as_table(section, value)? {
        let value = match value {
            Value::Boolean(b) => String::from(if *b { "1" } else { "0" }),
            Value::Integer(n) => n.to_string(),
            Value::String(s) => s.clone(),
            other => {
                return Err(Error::InvalidValue {
                    name: key.clone(),
                    value: other.to_string(),
                })
            }
        };
        properties.push((key.clone(), value));
    }
    Ok(properties)
}

/// Word lists as a string or an array of words per slot
fn parse_keywords(language: &str, value: &Value) -> Result<Vec<(usize, String)>> {
    let mut keywords = Vec::new();
    for (key, value) in as_table(language, value)? {
        let invalid = || Error::InvalidValue {
            name: format!("{}.keywords.{}", language, key),
            value: value.to_string(),
        };
        let slot: usize = key.parse().map_err(|_| invalid())?;
        let words = match value {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()?
                .join(" "),
            _ => return Err(invalid()),
        };
        keywords.push((slot, words));
    }
    Ok(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::haskell::HaskellLexer;
    use crate::syntax::builtin::r::RLexer;
    use crate::syntax::PropertyType;

    #[test]
    fn test_parse_config() {
        let contents = r#"
# Comment
[properties]
"fold.compact" = false

[languages.Haskell.properties]
fold = true
"lexer.haskell.allow.hash" = "0"

[languages.r.keywords]
0 = "if else"
2 = ["ggplot", "aes"]
        "#;

        let config = Config::parse(contents).unwrap();
        assert_eq!(
            config.properties,
            vec![("fold.compact".to_string(), "0".to_string())]
        );
        let haskell = &config.languages["haskell"];
        assert!(haskell
            .properties
            .contains(&("fold".to_string(), "1".to_string())));
        assert!(haskell
            .properties
            .contains(&("lexer.haskell.allow.hash".to_string(), "0".to_string())));
        let r = &config.languages["r"];
        assert!(r.keywords.contains(&(0, "if else".to_string())));
        assert!(r.keywords.contains(&(2, "ggplot aes".to_string())));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Config::parse("[properties"), Err(Error::Config(_))));
        assert!(matches!(
            Config::parse("properties = 3"),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            Config::parse("[languages.r.keywords]\nfirst = \"if\""),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            Config::parse("[properties]\nfold = [1]"),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = Path::new("/nonexistent/foldlex/config.toml");
        assert_eq!(Config::load_from(path).unwrap(), Config::default());
    }

    #[test]
    fn test_apply_to() {
        let config = Config::parse(
            r#"
[properties]
"fold.compact" = false
"fold.at.else" = true

[languages.haskell.properties]
fold = true
"#,
        )
        .unwrap();

        // Global properties reach only lexers declaring them
        let mut haskell = HaskellLexer::new();
        config.apply_to(&mut haskell).unwrap();
        assert!(!haskell.property_set("fold", "1").unwrap());
        assert!(!haskell.property_set("fold.compact", "0").unwrap());

        let mut r = RLexer::new();
        config.apply_to(&mut r).unwrap();
        assert!(!r.property_set("fold.at.else", "1").unwrap());
        assert!(!r.property_set("fold.compact", "0").unwrap());
    }

    #[test]
    fn test_apply_rejects_unknown_language_property() {
        let config = Config::parse("[languages.r.properties]\nfold = true").unwrap();
        let mut r = RLexer::new();
        assert!(matches!(
            config.apply_to(&mut r),
            Err(Error::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_global_property_applied() {
        let config = Config::parse("[properties]\n\"fold.compact\" = false").unwrap();
        assert_eq!(
            config.properties,
            vec![("fold.compact".to_string(), "0".to_string())]
        );
        let mut r = RLexer::new();
        config.apply_to(&mut r).unwrap();
        assert_eq!(r.property_type("fold.compact"), Some(PropertyType::Boolean));
        assert!(!r.property_set("fold.compact", "false").unwrap());
    }
}
