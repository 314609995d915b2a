//! Persistence for user settings.
//!
//! Settings live as one JSON record in a key-value store. The production
//! backend is a SQLite table at `~/.config/flipclock/flipclock.db`; tests and
//! embedders use [`MemoryStore`].

mod kv;
mod memory;
pub mod settings;

pub use kv::KvStore;
pub use memory::MemoryStore;
pub use settings::{
    SettingKey, Settings, SettingsStore, SharedSettings, TimeFormat, MAX_DURATION_MIN,
    MIN_DURATION_MIN, STORAGE_KEY,
};

use std::path::PathBuf;

use crate::error::StorageError;

/// A string key-value store that can hold the settings record.
pub trait KvBackend {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<B: KvBackend + ?Sized> KvBackend for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns the flipclock data directory.
///
/// `FLIPCLOCK_DATA_DIR` wins when set. Otherwise `~/.config/flipclock[-dev]/`
/// depending on `FLIPCLOCK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("FLIPCLOCK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FLIPCLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("flipclock-dev")
            } else {
                base_dir.join("flipclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
