//! Shared cache store that holds the mutation buffers
//!
//! The pipeline needs a small subset of a Redis-like store: string values
//! with a TTL and lists with atomic push and front trim. Buffers are
//! written only through this port.
//!
//! | Operation | Redis analogue |
//! |-----------|----------------|
//! | `get_string` / `set_string` | GET / SET EX |
//! | `list_push` | RPUSH + EXPIRE |
//! | `list_push_many` | MULTI + RPUSH/EXPIRE per key + EXEC |
//! | `list_range` | LRANGE 0 -1 |
//! | `list_trim_front` | LTRIM n -1 |
//! | `list_replace` | DEL + RPUSH + EXPIRE |
//! | `list_len` | LLEN |

pub mod memory;

pub use memory::MemoryCache;

use crate::error::QuireResult;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value cache with string and list values
///
/// Every write refreshes the key's TTL (sliding expiration). An absent or
/// expired key reads as empty.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a string value
    async fn get_string(&self, key: &str) -> QuireResult<Option<String>>;

    /// Write a string value, replacing whatever the key held
    async fn set_string(&self, key: &str, value: String, ttl: Duration) -> QuireResult<()>;

    /// Delete a key of any type
    async fn remove(&self, key: &str) -> QuireResult<()>;

    /// Append values to the tail of a list in one atomic step
    ///
    /// Returns the list length after the push.
    async fn list_push(&self, key: &str, values: Vec<String>, ttl: Duration) -> QuireResult<usize>;

    /// Append to several lists in one atomic step: every list grows or
    /// none does
    async fn list_push_many(
        &self,
        pushes: Vec<(String, Vec<String>)>,
        ttl: Duration,
    ) -> QuireResult<()>;

    /// Read the whole list, head first
    async fn list_range(&self, key: &str) -> QuireResult<Vec<String>>;

    /// Drop the first `count` elements; elements pushed later are kept
    async fn list_trim_front(&self, key: &str, count: usize) -> QuireResult<()>;

    /// Replace the whole list in one atomic step
    async fn list_replace(&self, key: &str, values: Vec<String>, ttl: Duration) -> QuireResult<()>;

    /// Number of elements in a list
    async fn list_len(&self, key: &str) -> QuireResult<usize>;

    /// Backend name for display
    fn backend_name(&self) -> &'static str;
}
