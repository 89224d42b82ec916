//! In-process storage backend

use super::{LinkStore, StoragePort, UnitOfWork};
use crate::domain::{Chapter, Comment, Link, Record, Tag, User, UserTag, Work, WorkLike, WorkTag};
use crate::error::{QuireError, QuireResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Rows of one record kind, ordered by key
pub struct Table<T: Record> {
    rows: Mutex<BTreeMap<T::Key, T>>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
        }
    }
}

/// Access to the table holding `T`
pub trait HasTable<T: Record> {
    fn table(&self) -> &Table<T>;
}

/// Storage backend with one table per record kind
///
/// Commits are all-or-nothing: the unit of work is applied to a copy of
/// the table and swapped in only when every change succeeds.
#[derive(Default)]
pub struct MemoryStore {
    works: Table<Work>,
    chapters: Table<Chapter>,
    comments: Table<Comment>,
    tags: Table<Tag>,
    users: Table<User>,
    work_tags: Table<WorkTag>,
    work_likes: Table<WorkLike>,
    user_tags: Table<UserTag>,
    offline: AtomicBool,
    commits: AtomicUsize,
}

macro_rules! tables {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl HasTable<$ty> for MemoryStore {
                fn table(&self) -> &Table<$ty> {
                    &self.$field
                }
            }
        )*
    };
}

tables! {
    Work => works,
    Chapter => chapters,
    Comment => comments,
    Tag => tags,
    User => users,
    WorkTag => work_tags,
    WorkLike => work_likes,
    UserTag => user_tags,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable database
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful commits so far
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Insert or replace a record outside any unit of work
    pub fn seed<T: Record>(&self, record: T) -> QuireResult<()>
    where
        Self: HasTable<T>,
    {
        let mut rows = self.rows::<T>()?;
        rows.insert(record.key(), record);
        Ok(())
    }

    /// Every committed record of a kind, in key order
    pub fn all<T: Record>(&self) -> QuireResult<Vec<T>>
    where
        Self: HasTable<T>,
    {
        Ok(self.rows::<T>()?.values().cloned().collect())
    }

    fn rows<T: Record>(&self) -> QuireResult<std::sync::MutexGuard<'_, BTreeMap<T::Key, T>>>
    where
        Self: HasTable<T>,
    {
        if self.offline.load(Ordering::SeqCst) {
            return Err(QuireError::StorageUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        <Self as HasTable<T>>::table(self)
            .rows
            .lock()
            .map_err(|_| QuireError::Internal(format!("{} table lock poisoned", T::KIND)))
    }
}

fn key_text<K: std::fmt::Debug>(key: &K) -> String {
    format!("{:?}", key)
}

#[async_trait]
impl<T: Record> StoragePort<T> for MemoryStore
where
    MemoryStore: HasTable<T>,
{
    async fn get_by_id(&self, key: &T::Key) -> QuireResult<Option<T>> {
        Ok(self.rows::<T>()?.get(key).cloned())
    }

    async fn existing(&self, keys: &[T::Key]) -> QuireResult<Vec<T::Key>> {
        let rows = self.rows::<T>()?;
        Ok(keys.iter().filter(|k| rows.contains_key(k)).cloned().collect())
    }

    async fn commit(&self, unit: UnitOfWork<T>) -> QuireResult<()> {
        let mut rows = self.rows::<T>()?;
        let mut next = rows.clone();

        for record in unit.added {
            let key = record.key();
            if next.contains_key(&key) {
                return Err(QuireError::Duplicate {
                    kind: T::KIND,
                    id: key_text(&key),
                });
            }
            next.insert(key, record);
        }

        for record in unit.updated {
            let key = record.key();
            match next.get_mut(&key) {
                Some(row) => *row = record,
                None => return Err(QuireError::not_found(T::KIND, key_text(&key))),
            }
        }

        for key in &unit.deleted {
            next.remove(key);
        }

        *rows = next;
        self.commits.fetch_add(1, Ordering::SeqCst);
        debug!("Committed {} unit of work", T::KIND);
        Ok(())
    }
}

#[async_trait]
impl<T: Link> LinkStore<T> for MemoryStore
where
    MemoryStore: HasTable<T>,
{
    async fn links_from(&self, left: Uuid) -> QuireResult<Vec<T>> {
        Ok(self
            .rows::<T>()?
            .values()
            .filter(|link| link.left() == left)
            .cloned()
            .collect())
    }

    async fn links_to(&self, right: Uuid) -> QuireResult<Vec<T>> {
        Ok(self
            .rows::<T>()?
            .values()
            .filter(|link| link.right() == right)
            .cloned()
            .collect())
    }
}
