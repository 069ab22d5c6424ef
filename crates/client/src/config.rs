//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `EMPORIUM_STORAGE_DIR` - Directory holding persisted stores (default: .emporium)
//! - `EMPORIUM_PERSIST_DEBOUNCE_MS` - Quiet period before a change is written (default: 250)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::storage::FileStorage;
use crate::store::StoreOptions;

const DEFAULT_STORAGE_DIR: &str = ".emporium";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory for [`FileStorage`]
    pub storage_dir: PathBuf,
    /// Debounce applied to persisted stores
    pub persist_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            persist_debounce: StoreOptions::DEFAULT_DEBOUNCE,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_dir = lookup("EMPORIUM_STORAGE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);

        let persist_debounce = match lookup("EMPORIUM_PERSIST_DEBOUNCE_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "EMPORIUM_PERSIST_DEBOUNCE_MS".to_string(),
                        e.to_string(),
                    )
                })?,
            None => StoreOptions::DEFAULT_DEBOUNCE,
        };

        Ok(Self {
            storage_dir,
            persist_debounce,
        })
    }

    /// Store options derived from this configuration.
    #[must_use]
    pub const fn store_options(&self) -> StoreOptions {
        StoreOptions {
            debounce: self.persist_debounce,
        }
    }

    /// File storage rooted at `storage_dir`.
    #[must_use]
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(self.storage_dir.clone())
    }
}
