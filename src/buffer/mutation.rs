//! Append, snapshot, and evict on top of the cache store

use super::{BufferKey, Envelope};
use crate::cache::CacheStore;
use crate::error::{QuireError, QuireResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How a buffer is laid out in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferMode {
    /// One list element per envelope; appends and evictions are atomic
    #[default]
    List,
    /// One JSON array in a string value, rewritten on every append
    ///
    /// Concurrent appends race and can lose items. Only for caches without
    /// list support.
    Scalar,
}

impl fmt::Display for BufferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// Decoded contents of a buffer at the moment it was read
#[derive(Debug, Clone)]
pub struct Batch<T> {
    pub key: BufferKey,
    pub entries: Vec<Envelope<T>>,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enqueue time of the head item
    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.entries.first().map(|e| e.at)
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn into_items(self) -> Vec<T> {
        self.entries.into_iter().map(|e| e.item).collect()
    }
}

/// Items bound for several buffers, queued together by
/// [`MutationBuffer::commit`]
///
/// Envelopes are encoded as items are staged, so a serialization error
/// surfaces before anything reaches the cache.
#[derive(Debug, Default)]
pub struct Staged {
    pushes: Vec<(BufferKey, Vec<serde_json::Value>)>,
}

impl Staged {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Serialize>(&mut self, key: BufferKey, item: &T) -> QuireResult<()> {
        let value = Envelope::new(item).to_value(key)?;
        match self.pushes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.pushes.push((key, vec![value])),
        }
        Ok(())
    }

    pub fn push_all<T: Serialize>(&mut self, key: BufferKey, items: &[T]) -> QuireResult<()> {
        for item in items {
            self.push(key, item)?;
        }
        Ok(())
    }

    /// Staged items across every buffer
    pub fn len(&self) -> usize {
        self.pushes.iter().map(|(_, values)| values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pushes.is_empty()
    }

    /// Buffers that would grow, in first-staged order
    pub fn keys(&self) -> Vec<BufferKey> {
        self.pushes.iter().map(|(key, _)| *key).collect()
    }
}

/// Handle on every buffer in one cache
#[derive(Clone)]
pub struct MutationBuffer {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    mode: BufferMode,
}

impl MutationBuffer {
    pub fn new(cache: Arc<dyn CacheStore>, ttl: Duration, mode: BufferMode) -> Self {
        if mode == BufferMode::Scalar {
            warn!(
                "Scalar buffer mode on {} cache: concurrent appends may be lost",
                cache.backend_name()
            );
        }
        Self { cache, ttl, mode }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn mode(&self) -> BufferMode {
        self.mode
    }

    /// Queue one item at the tail of `key`
    pub async fn append<T: Serialize + Sync>(&self, key: BufferKey, item: &T) -> QuireResult<()> {
        self.append_all(key, std::slice::from_ref(item)).await
    }

    /// Queue several items in one call, preserving their order
    pub async fn append_all<T: Serialize + Sync>(
        &self,
        key: BufferKey,
        items: &[T],
    ) -> QuireResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        match self.mode {
            BufferMode::List => {
                let encoded = items
                    .iter()
                    .map(|item| Envelope::new(item).encode(key))
                    .collect::<QuireResult<Vec<_>>>()?;
                let len = self.cache.list_push(key.as_str(), encoded, self.ttl).await?;
                debug!("Buffered {} item(s) on {} ({} pending)", items.len(), key, len);
            }
            BufferMode::Scalar => {
                let mut values = self.read_scalar(key).await?;
                for item in items {
                    values.push(Envelope::new(item).to_value(key)?);
                }
                let len = values.len();
                self.write_scalar(key, values).await?;
                debug!("Buffered {} item(s) on {} ({} pending)", items.len(), key, len);
            }
        }
        Ok(())
    }

    /// Queue everything in `staged`
    ///
    /// In list mode every buffer grows or none does. Scalar mode rewrites
    /// one buffer after another and can stop part way.
    pub async fn commit(&self, staged: Staged) -> QuireResult<()> {
        if staged.is_empty() {
            return Ok(());
        }
        let total = staged.len();
        let buffers = staged.pushes.len();

        match self.mode {
            BufferMode::List => {
                let pushes = staged
                    .pushes
                    .into_iter()
                    .map(|(key, values)| {
                        let encoded = values
                            .iter()
                            .map(|value| {
                                serde_json::to_string(value)
                                    .map_err(|e| QuireError::serialization(key.as_str(), e))
                            })
                            .collect::<QuireResult<Vec<_>>>()?;
                        Ok((key.as_str().to_string(), encoded))
                    })
                    .collect::<QuireResult<Vec<_>>>()?;
                self.cache.list_push_many(pushes, self.ttl).await?;
            }
            BufferMode::Scalar => {
                for (key, values) in staged.pushes {
                    let mut current = self.read_scalar(key).await?;
                    current.extend(values);
                    self.write_scalar(key, current).await?;
                }
            }
        }
        debug!("Buffered {} item(s) across {} buffer(s)", total, buffers);
        Ok(())
    }

    /// Overwrite the whole buffer with `items`
    pub async fn replace_all<T: Serialize + Sync>(
        &self,
        key: BufferKey,
        items: &[T],
    ) -> QuireResult<()> {
        match self.mode {
            BufferMode::List => {
                let encoded = items
                    .iter()
                    .map(|item| Envelope::new(item).encode(key))
                    .collect::<QuireResult<Vec<_>>>()?;
                self.cache.list_replace(key.as_str(), encoded, self.ttl).await
            }
            BufferMode::Scalar => {
                let values = items
                    .iter()
                    .map(|item| Envelope::new(item).to_value(key))
                    .collect::<QuireResult<Vec<_>>>()?;
                self.write_scalar(key, values).await
            }
        }
    }

    /// Read and decode everything currently queued on `key`
    ///
    /// An absent or expired buffer reads as an empty batch.
    pub async fn snapshot<T: DeserializeOwned>(&self, key: BufferKey) -> QuireResult<Batch<T>> {
        let entries = match self.mode {
            BufferMode::List => self
                .cache
                .list_range(key.as_str())
                .await?
                .iter()
                .map(|raw| Envelope::decode(key, raw))
                .collect::<QuireResult<Vec<_>>>()?,
            BufferMode::Scalar => self
                .read_scalar(key)
                .await?
                .into_iter()
                .map(|value| Envelope::from_value(key, value))
                .collect::<QuireResult<Vec<_>>>()?,
        };
        Ok(Batch { key, entries })
    }

    /// Drop the first `consumed` items of `key`
    ///
    /// Items appended after the snapshot that produced `consumed` stay queued.
    pub async fn evict(&self, key: BufferKey, consumed: usize) -> QuireResult<()> {
        if consumed == 0 {
            return Ok(());
        }

        match self.mode {
            BufferMode::List => self.cache.list_trim_front(key.as_str(), consumed).await?,
            BufferMode::Scalar => {
                let mut values = self.read_scalar(key).await?;
                values.drain(..consumed.min(values.len()));
                self.write_scalar(key, values).await?;
            }
        }
        debug!("Evicted {} item(s) from {}", consumed, key);
        Ok(())
    }

    /// Number of items waiting on `key`
    pub async fn pending(&self, key: BufferKey) -> QuireResult<usize> {
        match self.mode {
            BufferMode::List => self.cache.list_len(key.as_str()).await,
            BufferMode::Scalar => Ok(self.read_scalar(key).await?.len()),
        }
    }

    async fn read_scalar(&self, key: BufferKey) -> QuireResult<Vec<serde_json::Value>> {
        match self.cache.get_string(key.as_str()).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| QuireError::serialization(key.as_str(), e)),
        }
    }

    async fn write_scalar(&self, key: BufferKey, values: Vec<serde_json::Value>) -> QuireResult<()> {
        if values.is_empty() {
            return self.cache.remove(key.as_str()).await;
        }
        let raw = serde_json::to_string(&values)
            .map_err(|e| QuireError::serialization(key.as_str(), e))?;
        self.cache.set_string(key.as_str(), raw, self.ttl).await
    }
}
