//! Error types for Quire
//!
//! All modules use `QuireResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Quire operations
pub type QuireResult<T> = Result<T, QuireError>;

/// All errors that can occur in Quire
#[derive(Error, Debug)]
pub enum QuireError {
    // Transient I/O errors
    #[error("Cache store unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Chat delivery failed: {0}")]
    Chat(String),

    // Domain errors
    #[error("Validation failed for {entity}: {reason}")]
    Validation { entity: &'static str, reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("{0}")]
    ToggleConflict(String),

    // Buffer errors
    #[error("Corrupt buffer {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Buffer {key} holds schema version {found}, expected {expected}")]
    SchemaVersion { key: String, found: u16, expected: u16 },

    #[error("Flush of {key} stopped after {consumed} item(s): {source}")]
    PartialFlush {
        key: String,
        consumed: usize,
        #[source]
        source: Box<QuireError>,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Buffer TTL of {ttl_secs}s does not outlive worker {worker} ({interval_secs}s interval)")]
    TimingInvariant {
        worker: String,
        ttl_secs: u64,
        interval_secs: u64,
    },

    #[error("Worker {0} has a zero interval")]
    ZeroInterval(String),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuireError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a validation error for an entity kind
    pub fn validation(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            reason: reason.into(),
        }
    }

    /// Create a serialization error for a buffer key
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }

    /// Create a not-found error
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Check if error is retryable
    ///
    /// Retryable errors leave a buffer intact; the next tick tries again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::CacheUnavailable(_)
            | Self::StorageUnavailable(_)
            | Self::Mail(_)
            | Self::Chat(_) => true,
            Self::PartialFlush { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::TimingInvariant { .. } => {
                Some("Raise buffer.ttl_secs above every [workers] interval")
            }
            Self::SchemaVersion { .. } => {
                Some("Drain the buffer with the release that wrote it before upgrading")
            }
            Self::ZeroInterval(_) => Some("Set every [workers] interval to at least 1 second"),
            Self::ConfigInvalid { .. } => Some("Fix the reported line, or remove the file to use defaults"),
            _ => None,
        }
    }
}
