//! Runtime configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory:
//!
//! - `STOK_DATA_DIR`: directory holding the inventory database
//!   (default `{data_dir}/stok`, where `data_dir` is `~/.local/share` on Linux,
//!   `~/Library/Application Support` on macOS, `%APPDATA%` on Windows)
//! - `STOK_RECORDS_KEY`, `STOK_COUNTER_KEY`: storage key names

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::store::StoreKeys;

const DATABASE_FILE: &str = "inventory.db";

/// Where and under which keys inventory data is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub keys: StoreKeys,
}

impl Config {
    /// Builds the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `STOK_DATA_DIR` is unset and the platform data
    /// directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is the common case.
        let _ = dotenvy::dotenv();

        let data_dir = match std::env::var_os("STOK_DATA_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let defaults = StoreKeys::default();
        let keys = StoreKeys {
            records: env_or("STOK_RECORDS_KEY", defaults.records),
            counter: env_or("STOK_COUNTER_KEY", defaults.counter),
            legacy_tags: defaults.legacy_tags,
        };

        Ok(Self { data_dir, keys })
    }

    /// Path of the SQLite database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create data directory: {}", parent.display())
        })?;
    }
    Ok(())
}

fn default_data_dir() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;
    Ok(data_dir.join("stok"))
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("STOK_DATA_DIR");
            std::env::remove_var("STOK_RECORDS_KEY");
            std::env::remove_var("STOK_COUNTER_KEY");
        }
    }

    #[test]
    #[serial]
    fn defaults_use_platform_data_dir() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert!(config.data_dir.ends_with("stok"));
        assert_eq!(config.keys, StoreKeys::default());
        assert!(config.database_path().ends_with("stok/inventory.db"));
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("STOK_DATA_DIR", "/tmp/stok-test");
            std::env::set_var("STOK_RECORDS_KEY", "test_stockData");
        }

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/stok-test"));
        assert_eq!(config.keys.records, "test_stockData");
        assert_eq!(config.keys.counter, "productCounter");
    }

    #[test]
    #[serial]
    fn blank_key_override_is_ignored() {
        clear_env();
        unsafe { std::env::set_var("STOK_COUNTER_KEY", "  ") };

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.keys.counter, "productCounter");
    }

    #[test]
    fn ensure_database_directory_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("a").join("b").join(DATABASE_FILE);

        ensure_database_directory(&db_path).unwrap();

        assert!(db_path.parent().unwrap().is_dir());
    }
}
