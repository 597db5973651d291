//! Settings tree and typed accessors
//!
//! Required values are read with `get_*`, which fails with the offending
//! key when the entry is absent or has the wrong type. Optional values are
//! read with `get_*_opt`: absence is `None`, a wrong type is still an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for settings access
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while reading settings
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("Missing setting '{0}'")]
    MissingKey(String),

    #[error("Setting '{key}' must be {expected}, found {actual}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Setting '{key}' has invalid value: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl SettingsError {
    /// Creates an invalid-value error for a key
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SettingsError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// A single settings entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Tree(Settings),
}

impl SettingValue {
    fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Int(_) => "int",
            SettingValue::Double(_) => "double",
            SettingValue::String(_) => "string",
            SettingValue::Tree(_) => "tree",
        }
    }
}

/// Nested key/value settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    entries: BTreeMap<String, SettingValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add_bool(&mut self, key: &str, value: bool) {
        self.entries.insert(key.to_string(), SettingValue::Bool(value));
    }

    pub fn add_int(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), SettingValue::Int(value));
    }

    pub fn add_double(&mut self, key: &str, value: f64) {
        self.entries.insert(key.to_string(), SettingValue::Double(value));
    }

    pub fn add_string(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .insert(key.to_string(), SettingValue::String(value.into()));
    }

    /// Adds a sub-tree, replacing any existing entry
    pub fn add_tree(&mut self, key: &str, tree: Settings) {
        self.entries.insert(key.to_string(), SettingValue::Tree(tree));
    }

    fn get(&self, key: &str) -> SettingsResult<&SettingValue> {
        self.entries
            .get(key)
            .ok_or_else(|| SettingsError::MissingKey(key.to_string()))
    }

    fn wrong_type(key: &str, expected: &'static str, found: &SettingValue) -> SettingsError {
        SettingsError::WrongType {
            key: key.to_string(),
            expected,
            actual: found.kind(),
        }
    }

    pub fn get_bool(&self, key: &str) -> SettingsResult<bool> {
        match self.get(key)? {
            SettingValue::Bool(b) => Ok(*b),
            other => Err(Self::wrong_type(key, "bool", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> SettingsResult<i64> {
        match self.get(key)? {
            SettingValue::Int(i) => Ok(*i),
            other => Err(Self::wrong_type(key, "int", other)),
        }
    }

    /// Reads a double; integer entries are widened
    pub fn get_double(&self, key: &str) -> SettingsResult<f64> {
        match self.get(key)? {
            SettingValue::Double(d) => Ok(*d),
            SettingValue::Int(i) => Ok(*i as f64),
            other => Err(Self::wrong_type(key, "double", other)),
        }
    }

    pub fn get_string(&self, key: &str) -> SettingsResult<&str> {
        match self.get(key)? {
            SettingValue::String(s) => Ok(s),
            other => Err(Self::wrong_type(key, "string", other)),
        }
    }

    pub fn get_tree(&self, key: &str) -> SettingsResult<&Settings> {
        match self.get(key)? {
            SettingValue::Tree(t) => Ok(t),
            other => Err(Self::wrong_type(key, "tree", other)),
        }
    }

    pub fn get_int_opt(&self, key: &str) -> SettingsResult<Option<i64>> {
        if !self.contains_key(key) {
            return Ok(None);
        }
        self.get_int(key).map(Some)
    }

    pub fn get_tree_opt(&self, key: &str) -> SettingsResult<Option<&Settings>> {
        if !self.contains_key(key) {
            return Ok(None);
        }
        self.get_tree(key).map(Some)
    }
}
