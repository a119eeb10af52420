use std::env;
use std::path::{Path, PathBuf};

const DEFAULT_PATH: &str = "target/bucketdb";
const DEFAULT_CACHE_CAPACITY: u64 = 64 * 1024 * 1024;

/// Settings of the durable (sled-backed) engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub path: PathBuf,
    /// Page cache size in bytes.
    pub cache_capacity: u64,
    /// Flush to disk before an update transaction returns.
    pub flush_on_commit: bool,
    /// Remove all files once the engine is dropped.
    pub temporary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            flush_on_commit: true,
            temporary: false,
        }
    }
}

impl Config {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `BUCKETDB_PATH`, `BUCKETDB_CACHE_CAPACITY` and
    /// `BUCKETDB_FLUSH_ON_COMMIT` (`0`/`false` to disable). Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Self {
        let mut config = Self::default();
        if let Some(path) = var("BUCKETDB_PATH") {
            config.path = PathBuf::from(path);
        }
        if let Some(cap) = var("BUCKETDB_CACHE_CAPACITY").and_then(|s| s.parse().ok()) {
            config.cache_capacity = cap;
        }
        if let Some(flush) = var("BUCKETDB_FLUSH_ON_COMMIT") {
            config.flush_on_commit = !matches!(flush.as_str(), "0" | "false");
        }
        config
    }

    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    pub fn flush_on_commit(mut self, flush: bool) -> Self {
        self.flush_on_commit = flush;
        self
    }

    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_builder() {
        let config = Config::new("target/x").cache_capacity(1024).temporary(true);
        assert_eq!(config.path, PathBuf::from("target/x"));
        assert_eq!(config.cache_capacity, 1024);
        assert!(config.flush_on_commit);
        assert!(config.temporary);
    }

    #[test]
    fn test_from_vars() {
        let vars: HashMap<&str, &str> = vec![
            ("BUCKETDB_PATH", "/tmp/users"),
            ("BUCKETDB_CACHE_CAPACITY", "not-a-number"),
            ("BUCKETDB_FLUSH_ON_COMMIT", "false"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_vars(|name| vars.get(name).map(|s| s.to_string()));
        assert_eq!(config.path, PathBuf::from("/tmp/users"));
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(!config.flush_on_commit);
        assert!(!config.temporary);
    }
}
