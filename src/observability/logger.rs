//! Structured JSON event lines
//!
//! Every line is one JSON object with sorted keys, carrying `event` and
//! `level` plus caller fields. Lines go through the `log` facade under the
//! `rowfilter` target, so the binary decides where they end up.

use log::Level;
use serde_json::{Map, Value};

/// Log target for every event emitted by this crate
pub const LOG_TARGET: &str = "rowfilter";

/// Emits structured event lines
pub struct Logger;

impl Logger {
    pub fn emit(level: Level, event: &str, fields: &[(&str, &str)]) {
        if log::log_enabled!(target: LOG_TARGET, level) {
            log::log!(target: LOG_TARGET, level, "{}", Self::render(level, event, fields));
        }
    }

    /// Renders one line without the trailing newline.
    ///
    /// `event` and `level` overwrite caller fields of the same name.
    pub fn render(level: Level, event: &str, fields: &[(&str, &str)]) -> String {
        let mut object: Map<String, Value> = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::from(*v)))
            .collect();
        object.insert("event".into(), Value::from(event));
        object.insert("level".into(), Value::from(level.as_str()));

        Value::Object(object).to_string()
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::emit(Level::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::emit(Level::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::emit(Level::Error, event, fields);
    }
}
