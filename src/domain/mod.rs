//! Domain model for the publishing backend
//!
//! Entities validate themselves on construction and on every update, so a
//! record that reaches storage always satisfies its rules. Updates travel
//! through the buffers as sparse patches and are applied by the flush
//! workers through the entity's own update method.

pub mod chapter;
pub mod comment;
pub mod links;
pub mod primitives;
pub mod tag;
pub mod user;
mod validate;
pub mod work;

pub use chapter::{Chapter, ChapterPatch};
pub use comment::{Comment, CommentPatch};
pub use links::{Link, UserTag, WorkLike, WorkTag};
pub use primitives::{AgeRestriction, Category};
pub use tag::{Tag, TagPatch};
pub use user::User;
pub use work::{Work, WorkPatch};

use crate::error::QuireResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// A persisted record addressable by key
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key (a UUID for entities, a UUID pair for links)
    type Key: Clone + Ord + fmt::Debug + Send + Sync + 'static;

    /// Entity kind name used in logs and errors
    const KIND: &'static str;

    /// Key of this record
    fn key(&self) -> Self::Key;
}

/// A sparse change to an existing record
///
/// The patch names its target and applies itself through the entity's
/// update method, which re-validates the result.
pub trait Patch<T: Record>:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Key of the record this patch changes
    fn target(&self) -> T::Key;

    /// Apply the change, leaving `entity` untouched if validation fails
    fn apply_to(&self, entity: &mut T) -> QuireResult<()>;
}
