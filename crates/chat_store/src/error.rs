use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage key '{key}' must be non-empty ASCII letters, digits, '-', '_' or '.'")]
    InvalidKey { key: String },

    #[error("failed to parse stored JSON for key '{key}': {source}")]
    JsonDecode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize JSON for key '{key}': {source}")]
    JsonEncode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend unavailable while {operation} key '{key}'")]
    Unavailable {
        operation: &'static str,
        key: String,
    },
}

impl ChatStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_decode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonDecode {
            key: key.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_encode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonEncode {
            key: key.into(),
            source,
        }
    }
}
