//! Versioned wire format of a buffered item
//!
//! ```json
//! {"v": 1, "at": "2026-10-18T09:30:00Z", "item": { ... }}
//! ```

use super::BufferKey;
use crate::error::{QuireError, QuireResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Envelope version written by this release
pub const SCHEMA_VERSION: u16 = 1;

/// One buffered mutation with its schema version and enqueue time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub v: u16,
    pub at: DateTime<Utc>,
    pub item: T,
}

#[derive(Deserialize)]
struct Header {
    v: u16,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap an item stamped with the current time
    pub fn new(item: T) -> Self {
        Self {
            v: SCHEMA_VERSION,
            at: Utc::now(),
            item,
        }
    }

    pub(crate) fn to_value(&self, key: BufferKey) -> QuireResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| QuireError::serialization(key.as_str(), e))
    }

    pub(crate) fn encode(&self, key: BufferKey) -> QuireResult<String> {
        serde_json::to_string(self).map_err(|e| QuireError::serialization(key.as_str(), e))
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode an envelope, rejecting any other schema version
    pub(crate) fn from_value(key: BufferKey, value: serde_json::Value) -> QuireResult<Self> {
        let header = Header::deserialize(&value)
            .map_err(|e| QuireError::serialization(key.as_str(), e))?;
        if header.v != SCHEMA_VERSION {
            return Err(QuireError::SchemaVersion {
                key: key.as_str().to_string(),
                found: header.v,
                expected: SCHEMA_VERSION,
            });
        }
        serde_json::from_value(value).map_err(|e| QuireError::serialization(key.as_str(), e))
    }

    pub(crate) fn decode(key: BufferKey, raw: &str) -> QuireResult<Self> {
        let value = serde_json::from_str(raw)
            .map_err(|e| QuireError::serialization(key.as_str(), e))?;
        Self::from_value(key, value)
    }
}
