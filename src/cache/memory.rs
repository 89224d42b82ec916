//! In-process cache store with sliding TTL

use super::CacheStore;
use crate::error::{QuireError, QuireResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(VecDeque<String>),
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Cache store backed by a mutex-guarded map
///
/// Every operation runs under one lock, which makes list pushes and trims
/// atomic with respect to each other. Expiry uses tokio's clock so tests can
/// pause and advance time.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    offline: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable cache; every call fails with `CacheUnavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock(&self) -> QuireResult<MutexGuard<'_, HashMap<String, Entry>>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(QuireError::CacheUnavailable(
                "memory cache is offline".to_string(),
            ));
        }
        self.entries
            .lock()
            .map_err(|_| QuireError::Internal("memory cache lock poisoned".to_string()))
    }
}

/// Drop the entry for `key` if its TTL has run out
fn purge_expired(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries
        .get(key)
        .is_some_and(|entry| entry.expires_at <= Instant::now())
    {
        debug!("Cache key {} expired", key);
        entries.remove(key);
    }
}

fn wrong_type(key: &str, wanted: &str) -> QuireError {
    QuireError::Internal(format!("cache key {} does not hold a {}", key, wanted))
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get_string(&self, key: &str) -> QuireResult<Option<String>> {
        let mut entries = self.lock()?;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            None => Ok(None),
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key, "string")),
        }
    }

    async fn set_string(&self, key: &str, value: String, ttl: Duration) -> QuireResult<()> {
        let mut entries = self.lock()?;
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> QuireResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn list_push(&self, key: &str, values: Vec<String>, ttl: Duration) -> QuireResult<usize> {
        let mut entries = self.lock()?;
        purge_expired(&mut entries, key);
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::List(VecDeque::new()),
            expires_at: Instant::now(),
        });
        let Value::List(list) = &mut entry.value else {
            return Err(wrong_type(key, "list"));
        };
        list.extend(values);
        entry.expires_at = Instant::now() + ttl;
        Ok(list.len())
    }

    async fn list_push_many(
        &self,
        pushes: Vec<(String, Vec<String>)>,
        ttl: Duration,
    ) -> QuireResult<()> {
        let mut entries = self.lock()?;
        for (key, _) in &pushes {
            purge_expired(&mut entries, key);
            if let Some(Entry {
                value: Value::Str(_),
                ..
            }) = entries.get(key)
            {
                return Err(wrong_type(key, "list"));
            }
        }

        let expires_at = Instant::now() + ttl;
        for (key, values) in pushes {
            let entry = entries.entry(key).or_insert_with(|| Entry {
                value: Value::List(VecDeque::new()),
                expires_at,
            });
            if let Value::List(list) = &mut entry.value {
                list.extend(values);
            }
            entry.expires_at = expires_at;
        }
        Ok(())
    }

    async fn list_range(&self, key: &str) -> QuireResult<Vec<String>> {
        let mut entries = self.lock()?;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::List(list),
                ..
            }) => Ok(list.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }

    async fn list_trim_front(&self, key: &str, count: usize) -> QuireResult<()> {
        let mut entries = self.lock()?;
        purge_expired(&mut entries, key);
        let Some(entry) = entries.get_mut(key) else {
            return Ok(());
        };
        let Value::List(list) = &mut entry.value else {
            return Err(wrong_type(key, "list"));
        };
        let count = count.min(list.len());
        list.drain(..count);
        if list.is_empty() {
            entries.remove(key);
        }
        Ok(())
    }

    async fn list_replace(&self, key: &str, values: Vec<String>, ttl: Duration) -> QuireResult<()> {
        let mut entries = self.lock()?;
        if values.is_empty() {
            entries.remove(key);
            return Ok(());
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::List(values.into()),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn list_len(&self, key: &str) -> QuireResult<usize> {
        let mut entries = self.lock()?;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            None => Ok(0),
            Some(Entry {
                value: Value::List(list),
                ..
            }) => Ok(list.len()),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
