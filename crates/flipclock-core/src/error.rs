//! Core error types for flipclock-core.
//!
//! The timer engine itself never fails; these errors surface from the
//! settings layer and the storage backend, and most of them are logged and
//! swallowed by the callers that own the degrade-to-defaults policy.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for flipclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the key-value database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,

    /// The backend refuses all access (no storage capability)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown setting key
    #[error("Unknown setting key: {0}")]
    UnknownKey(String),

    /// Invalid value for a known key
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_database_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(StorageError::from(err), StorageError::Locked));
    }

    #[test]
    fn layer_errors_convert_into_core_error() {
        fn unknown() -> Result<()> {
            let lookup: Result<(), ConfigError> = Err(ConfigError::UnknownKey("volume".into()));
            lookup?;
            Ok(())
        }
        let err = unknown().unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown setting key: volume"
        );
    }
}
