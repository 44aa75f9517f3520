//! Immutable key/value configuration threaded through every probe.
//!
//! A [`Config`] is created per resolution call and never mutated in place.
//! Deriving a copy with one key shadowed ([`Config::with`]) leaves the
//! caller's map untouched, so a backend can see an adjusted view without
//! side effects. Unknown keys are forwarded verbatim to every probe.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known configuration keys
pub mod keys {
    /// Integer; gates how much per-candidate detail is logged
    pub const DEBUG_VERBOSITY: &str = "debug_verbosity";
    /// Override for the derived index-file location of split archives
    pub const INDEX_FILE_PATH: &str = "index_file_path";
    /// Ordered backend ids tried before everything else
    pub const PRIORITY_BACKENDS: &str = "priority_backends";
    /// Bool; whether a text/html remote file may be treated as a listing
    pub const HTML_DIRECTORY_LISTING: &str = "html_directory_listing";
    /// Logical name of a source that arrived as an anonymous stream
    pub const SOURCE_NAME: &str = "source_name";
}

/// Immutable configuration map passed to every backend probe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    values: BTreeMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion while constructing a config
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Derived copy with one key shadowed; `self` is left untouched
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut copy = self.clone();
        copy.values.insert(key.into(), value.into());
        copy
    }

    /// Derived copy with one key removed; `self` is left untouched
    pub fn without(&self, key: &str) -> Self {
        let mut copy = self.clone();
        copy.values.remove(key);
        copy
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Debug verbosity, 0 when unset or not an integer
    pub fn debug_verbosity(&self) -> i64 {
        self.get(keys::DEBUG_VERBOSITY)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// Explicit index-file override, if any
    pub fn index_file_path(&self) -> Option<PathBuf> {
        self.get(keys::INDEX_FILE_PATH)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    /// Ordered backend ids to try first; empty when unset
    pub fn priority_backends(&self) -> Vec<String> {
        self.get(keys::PRIORITY_BACKENDS)
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Hypertext directory heuristic override; defaults to enabled
    pub fn html_directory_listing(&self) -> bool {
        self.get(keys::HTML_DIRECTORY_LISTING)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Logical name for stream sources resolved from a URL
    pub fn source_name(&self) -> Option<&str> {
        self.get(keys::SOURCE_NAME).and_then(Value::as_str)
    }
}
