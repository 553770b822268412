//! Declared lexer properties
//!
//! Each lexer keeps its settings in a plain struct and declares the
//! named properties that map onto its fields, so hosts can list, describe
//! and set them by name.

use crate::error::{Error, Result};

/// Value type of a property
///
/// Every declared property is a boolean switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Boolean,
}

struct PropertyDef<T> {
    name: &'static str,
    description: &'static str,
    field: fn(&mut T) -> &mut bool,
}

/// Named properties over the options struct `T` plus word list slots
pub struct OptionSet<T> {
    properties: Vec<PropertyDef<T>>,
    word_lists: &'static [&'static str],
}

impl<T> OptionSet<T> {
    /// Create a set with the given word list slot descriptions
    pub fn new(word_lists: &'static [&'static str]) -> Self {
        Self {
            properties: Vec::new(),
            word_lists,
        }
    }

    /// Builder: declare a boolean property
    pub fn boolean(
        mut self,
        name: &'static str,
        field: fn(&mut T) -> &mut bool,
        description: &'static str,
    ) -> Self {
        self.properties.push(PropertyDef {
            name,
            description,
            field,
        });
        self
    }

    fn find(&self, name: &str) -> Option<&PropertyDef<T>> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Names of all declared properties, in declaration order
    pub fn property_names(&self) -> Vec<&'static str> {
        self.properties.iter().map(|p| p.name).collect()
    }

    /// Type of a property
    pub fn property_type(&self, name: &str) -> Option<PropertyType> {
        self.find(name).map(|_| PropertyType::Boolean)
    }

    /// Description of a property
    pub fn describe_property(&self, name: &str) -> Option<&'static str> {
        self.find(name).map(|p| p.description)
    }

    /// Set a property on `options`; returns whether the value changed
    pub fn property_set(&self, options: &mut T, name: &str, value: &str) -> Result<bool> {
        let def = self
            .find(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))?;
        let new = parse_bool(value).ok_or_else(|| Error::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })?;
        Ok(std::mem::replace((def.field)(options), new) != new)
    }

    /// Descriptions of the word list slots
    pub fn word_lists(&self) -> &'static [&'static str] {
        self.word_lists
    }
}

/// Parse a boolean value from string
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}
