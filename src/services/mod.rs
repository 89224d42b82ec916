//! Producer side: services that validate requests and buffer mutations
//!
//! Services never write to storage. Every mutating call returns a
//! [`Receipt`] in the `Pending` state; the change becomes durable when the
//! matching flush worker next runs.

pub mod chapter;
pub mod comment;
pub mod tag;
pub mod work;

pub use chapter::{ChapterService, NewChapter};
pub use comment::{CommentService, NewComment};
pub use tag::{NewTag, TagService};
pub use work::{NewWork, WorkService};

use crate::buffer::{BufferKey, MutationBuffer};
use crate::domain::{Record, User};
use crate::error::{QuireError, QuireResult};
use crate::notify::Notifier;
use crate::storage::{StoragePort, Stores};
use serde::Serialize;
use uuid::Uuid;

/// Durability of a write at the time it was acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteState {
    /// Buffered, not yet committed to storage
    Pending,
}

/// Acknowledgement of a buffered write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt<T> {
    pub state: WriteState,

    /// Buffer holding the write
    pub key: BufferKey,

    /// The buffered record for creates; the committed record before the
    /// change for updates
    pub snapshot: T,
}

impl<T> Receipt<T> {
    pub(crate) fn pending(key: BufferKey, snapshot: T) -> Self {
        Self {
            state: WriteState::Pending,
            key,
            snapshot,
        }
    }
}

/// Shared handles every service needs
#[derive(Clone)]
pub struct ServiceContext {
    pub buffer: MutationBuffer,
    pub stores: Stores,
    pub notifier: Notifier,
}

impl ServiceContext {
    pub fn new(buffer: MutationBuffer, stores: Stores, notifier: Notifier) -> Self {
        Self {
            buffer,
            stores,
            notifier,
        }
    }

    pub(crate) async fn user(&self, id: Uuid) -> QuireResult<User> {
        committed(self.stores.users.as_ref(), id).await
    }
}

/// Committed record by id, or `NotFound`
pub(crate) async fn committed<T>(store: &dyn StoragePort<T>, id: Uuid) -> QuireResult<T>
where
    T: Record<Key = Uuid>,
{
    store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| QuireError::not_found(T::KIND, id))
}
