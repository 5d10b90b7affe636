//! Attribute lists, the `KEY=VALUE,KEY="VALUE"` payload of tags such as
//! `#EXT-X-MAP`, `#EXT-X-STREAM-INF` and `#EXT-X-MEDIA`.

use crate::error::AttributeError;
use std::fmt;
use std::str::FromStr;

/// A single attribute value, remembering whether it was written as a
/// quoted-string.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AttributeValue {
    Unquoted(String),
    Quoted(String),
}

impl Default for AttributeValue {
    fn default() -> Self {
        AttributeValue::Quoted(String::new())
    }
}

impl AttributeValue {
    /// The raw value, without surrounding quotes.
    pub fn as_str(&self) -> &str {
        match self {
            AttributeValue::Quoted(s) => s.as_str(),
            AttributeValue::Unquoted(s) => s.as_str(),
        }
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self, AttributeValue::Quoted(_))
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
            return AttributeValue::Quoted(s[1..s.len() - 1].to_string());
        }
        AttributeValue::Unquoted(s.to_string())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttributeValue::Unquoted(s) => write!(f, "{}", s),
            AttributeValue::Quoted(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Attribute name to value mapping.
///
/// Lookups do not depend on the order attributes were parsed in. The list
/// does keep insertion order so that rendering it is deterministic, and
/// inserting an existing name replaces the value in place.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttributeList {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeList {
    pub fn new() -> AttributeList {
        Default::default()
    }

    /// Parses a raw attribute list. Attributes that match none of the
    /// recognised value shapes are skipped.
    #[cfg(feature = "parser")]
    pub fn parse(input: &str) -> AttributeList {
        crate::parser::attribute_list(input)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Raw value of `name`, quotes stripped.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.value(name).map(AttributeValue::as_str)
    }

    /// Like [`get`](Self::get), but reports a missing attribute as an error.
    pub fn get_str(&self, name: &str) -> Result<&str, AttributeError> {
        self.get(name)
            .ok_or_else(|| AttributeError::Missing(name.to_string()))
    }

    pub fn get_int(&self, name: &str) -> Result<u64, AttributeError> {
        self.get_parsed(name)
    }

    pub fn get_float(&self, name: &str) -> Result<f64, AttributeError> {
        self.get_parsed(name)
    }

    fn get_parsed<T: FromStr>(&self, name: &str) -> Result<T, AttributeError> {
        let raw = self.get_str(name)?;
        raw.trim().parse().map_err(|_| AttributeError::Malformed {
            name: name.to_string(),
            value: raw.to_string(),
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn insert_quoted(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name, AttributeValue::Quoted(value.into()));
    }

    pub fn insert_unquoted(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.insert(name, AttributeValue::Unquoted(value.to_string()));
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl fmt::Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for AttributeList {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut attrs = AttributeList::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}
