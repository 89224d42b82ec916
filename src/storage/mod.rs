//! Relational storage port
//!
//! Flush workers stage a whole batch in a [`UnitOfWork`] and commit it in
//! one call; the commit either applies every staged change or none.

pub mod memory;

pub use memory::MemoryStore;

use crate::domain::{Chapter, Comment, Link, Record, Tag, User, UserTag, Work, WorkLike, WorkTag};
use crate::error::QuireResult;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Changes staged for one commit
#[derive(Debug, Clone)]
pub struct UnitOfWork<T: Record> {
    pub added: Vec<T>,
    pub updated: Vec<T>,
    pub deleted: Vec<T::Key>,
}

impl<T: Record> Default for UnitOfWork<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

impl<T: Record> UnitOfWork<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage new records; the commit fails if any key already exists
    pub fn bulk_add(&mut self, records: impl IntoIterator<Item = T>) -> &mut Self {
        self.added.extend(records);
        self
    }

    /// Stage full replacements of existing records
    pub fn bulk_update(&mut self, records: impl IntoIterator<Item = T>) -> &mut Self {
        self.updated.extend(records);
        self
    }

    /// Stage deletions by key
    pub fn bulk_delete(&mut self, keys: impl IntoIterator<Item = T::Key>) -> &mut Self {
        self.deleted.extend(keys);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Total number of staged changes
    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }
}

/// Committed records of one kind
#[async_trait]
pub trait StoragePort<T: Record>: Send + Sync {
    /// Committed record for `key`, if any
    async fn get_by_id(&self, key: &T::Key) -> QuireResult<Option<T>>;

    /// The subset of `keys` that is already committed
    async fn existing(&self, keys: &[T::Key]) -> QuireResult<Vec<T::Key>>;

    /// Apply a unit of work atomically
    async fn commit(&self, unit: UnitOfWork<T>) -> QuireResult<()>;
}

/// Storage for links, queryable from either side
#[async_trait]
pub trait LinkStore<T: Link>: StoragePort<T> {
    /// Every committed link whose left id is `left`
    async fn links_from(&self, left: Uuid) -> QuireResult<Vec<T>>;

    /// Every committed link whose right id is `right`
    async fn links_to(&self, right: Uuid) -> QuireResult<Vec<T>>;
}

/// One handle per record kind, shared by services and workers
#[derive(Clone)]
pub struct Stores {
    pub works: Arc<dyn StoragePort<Work>>,
    pub chapters: Arc<dyn StoragePort<Chapter>>,
    pub comments: Arc<dyn StoragePort<Comment>>,
    pub tags: Arc<dyn StoragePort<Tag>>,
    pub users: Arc<dyn StoragePort<User>>,
    pub work_tags: Arc<dyn LinkStore<WorkTag>>,
    pub work_likes: Arc<dyn LinkStore<WorkLike>>,
    pub user_tags: Arc<dyn LinkStore<UserTag>>,
}

impl Stores {
    /// Route every kind to the same backing store
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: StoragePort<Work>
            + StoragePort<Chapter>
            + StoragePort<Comment>
            + StoragePort<Tag>
            + StoragePort<User>
            + LinkStore<WorkTag>
            + LinkStore<WorkLike>
            + LinkStore<UserTag>
            + 'static,
    {
        Self {
            works: store.clone(),
            chapters: store.clone(),
            comments: store.clone(),
            tags: store.clone(),
            users: store.clone(),
            work_tags: store.clone(),
            work_likes: store.clone(),
            user_tags: store,
        }
    }
}
