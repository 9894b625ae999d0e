//! Configuration access by dotted key path

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Translate a field-style name into a configuration key path.
///
/// Runs of underscores are consumed left to right in chunks of up to
/// three: `___` becomes `_`, `__` becomes `-`, `_` becomes `.`.
pub fn key_of(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '_' {
            out.push(ch);
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&'_') {
            chars.next();
            run += 1;
        }
        while run > 0 {
            let take = run.min(3);
            out.push(match take {
                1 => '.',
                2 => '-',
                _ => '_',
            });
            run -= take;
        }
    }
    out
}

/// A read-only view over a JSON configuration tree.
///
/// Values are looked up by dotted key path; each lookup either demands the
/// key (`get_*`) or falls back to a default (`*_or`).
#[derive(Debug, Clone, Default)]
pub struct Config {
    root: Value,
}

impl Config {
    /// Parse a configuration from JSON text
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(Self {
            root: serde_json::from_str(json)?,
        })
    }

    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Check whether the given key path exists
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Look up a required string value
    pub fn get_str(&self, key: &str) -> Result<String> {
        let value = self
            .lookup(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))?;

        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::BadValue {
                key: key.to_string(),
                expected: "string",
            })
    }

    /// Look up a string value with a default fallback
    pub fn str_or(&self, key: &str, default: &str) -> String {
        match self.lookup(key).and_then(Value::as_str) {
            Some(value) => value.to_string(),
            None => default.to_string(),
        }
    }

    /// Look up a required boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self
            .lookup(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))?;

        value.as_bool().ok_or_else(|| Error::BadValue {
            key: key.to_string(),
            expected: "boolean",
        })
    }

    /// Look up a boolean value with a default fallback
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.lookup(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Look up a required integer value
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        let value = self
            .lookup(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))?;

        value.as_i64().ok_or_else(|| Error::BadValue {
            key: key.to_string(),
            expected: "integer",
        })
    }

    /// Look up an integer value with a default fallback
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.lookup(key).and_then(Value::as_i64).unwrap_or(default)
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;

        for part in key.split('.') {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_str(
            r#"{
                "path": "in.csv",
                "feed": { "delimiter": ",", "active": true, "batch": 100 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_key_of_single() {
        assert_eq!(key_of("a_b"), "a.b");
    }

    #[test]
    fn test_key_of_double() {
        assert_eq!(key_of("a__b"), "a-b");
    }

    #[test]
    fn test_key_of_triple() {
        assert_eq!(key_of("a___b"), "a_b");
    }

    #[test]
    fn test_key_of_long_runs_chunk_greedily() {
        assert_eq!(key_of("____"), "_.");
        assert_eq!(key_of("_____"), "_-");
    }

    #[test]
    fn test_key_of_plain_name() {
        assert_eq!(key_of("path"), "path");
    }

    #[test]
    fn test_get_str() {
        assert_eq!(config().get_str("path").unwrap(), "in.csv");
    }

    #[test]
    fn test_dotted_path_traversal() {
        let config = config();

        assert_eq!(config.get_str("feed.delimiter").unwrap(), ",");
        assert!(config.get_bool("feed.active").unwrap());
        assert_eq!(config.get_i64("feed.batch").unwrap(), 100);
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(
            config().get_str("nope"),
            Err(Error::MissingKey(key)) if key == "nope"
        ));
    }

    #[test]
    fn test_wrong_type() {
        assert!(matches!(
            config().get_str("feed.batch"),
            Err(Error::BadValue { expected: "string", .. })
        ));
    }

    #[test]
    fn test_defaults() {
        let config = config();

        assert_eq!(config.str_or("nope", "fallback"), "fallback");
        assert!(config.bool_or("nope", true));
        assert_eq!(config.int_or("feed.batch", 1), 100);
    }

    #[test]
    fn test_has() {
        let config = config();

        assert!(config.has("feed.active"));
        assert!(!config.has("feed.missing"));
    }
}
