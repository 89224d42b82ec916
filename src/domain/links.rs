//! Many-to-many links: work tags, likes, and followed tags
//!
//! Links have no identifier of their own. Their key is the pair of ids they
//! connect, which is also the value a delete carries through the buffer.

use super::validate::Rules;
use super::Record;
use crate::error::QuireResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A record keyed by `(left, right)`
pub trait Link: Record<Key = (Uuid, Uuid)> {
    fn left(&self) -> Uuid;
    fn right(&self) -> Uuid;
}

macro_rules! link {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $left:ident, $right:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub $left: Uuid,
            pub $right: Uuid,
        }

        impl $name {
            pub fn new($left: Uuid, $right: Uuid) -> QuireResult<Self> {
                Rules::new($kind)
                    .id(stringify!($left), $left)
                    .id(stringify!($right), $right)
                    .finish()?;
                Ok(Self { $left, $right })
            }
        }

        impl Record for $name {
            type Key = (Uuid, Uuid);
            const KIND: &'static str = $kind;

            fn key(&self) -> (Uuid, Uuid) {
                (self.$left, self.$right)
            }
        }

        impl Link for $name {
            fn left(&self) -> Uuid {
                self.$left
            }

            fn right(&self) -> Uuid {
                self.$right
            }
        }
    };
}

link!(
    /// A tag attached to a work
    WorkTag, "work_tag", work_id, tag_id
);

link!(
    /// A user's like on a work
    WorkLike, "work_like", user_id, work_id
);

link!(
    /// A tag followed by a user
    UserTag, "user_tag", user_id, tag_id
);
