//! Persisted settings tree
//!
//! Filter configurations are stored as a nested key/value tree with string
//! keys and bool, int, double, string or sub-tree values. The tree is
//! serialized as a plain JSON object.

mod tree;

pub use tree::{SettingValue, Settings, SettingsError, SettingsResult};
