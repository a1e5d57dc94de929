//! Free-form options map shared by the CLI and generator plugins.
//!
//! Generators declare their own options, so the runner cannot enumerate
//! every key up front. Known general options are parsed by the CLI surface;
//! everything else travels in this map. Positional arguments are stored
//! under `arg-1`, `arg-2`, ... so a project file can supply them by name.

use crate::error::{GenRunnerError, Result};
use std::collections::BTreeMap;

/// Ordered key/value option store. Later inserts overwrite earlier ones,
/// which gives command-line values precedence over project-file defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsMap {
    entries: BTreeMap<String, String>,
}

impl OptionsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Value of the n-th positional argument (1-based), if present.
    pub fn positional(&self, n: usize) -> Option<&str> {
        self.get(&format!("arg-{n}"))
    }

    /// Store the n-th positional argument (1-based).
    pub fn set_positional(&mut self, n: usize, value: impl Into<String>) {
        self.insert(format!("arg-{n}"), value);
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: OptionsMap) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a `KEY=VALUE` assignment as accepted by `--set`. A bare `KEY`
/// stores an empty value, matching flag-style generator options.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                return Err(GenRunnerError::config(format!(
                    "invalid option assignment '{raw}': empty key"
                )));
            }
            Ok((key.to_string(), value.trim().to_string()))
        }
        None => {
            let key = raw.trim();
            if key.is_empty() {
                return Err(GenRunnerError::config("invalid empty option assignment"));
            }
            Ok((key.to_string(), String::new()))
        }
    }
}
