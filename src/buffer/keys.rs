//! The fixed set of buffer keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One queue per (entity kind, operation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BufferKey {
    WorksCreate,
    WorksUpdate,
    ChaptersCreate,
    ChaptersUpdate,
    CommentsCreate,
    CommentsUpdate,
    TagsCreate,
    TagsUpdate,
    UserTagsCreate,
    UserTagsDelete,
    WorkLikesCreate,
    WorkLikesDelete,
    WorkTagsCreate,
    WorkTagsDelete,
    EmailsToSend,
}

impl BufferKey {
    /// Every key, in worker start order
    pub const ALL: [BufferKey; 15] = [
        Self::WorksCreate,
        Self::WorksUpdate,
        Self::ChaptersCreate,
        Self::ChaptersUpdate,
        Self::CommentsCreate,
        Self::CommentsUpdate,
        Self::TagsCreate,
        Self::TagsUpdate,
        Self::UserTagsCreate,
        Self::UserTagsDelete,
        Self::WorkLikesCreate,
        Self::WorkLikesDelete,
        Self::WorkTagsCreate,
        Self::WorkTagsDelete,
        Self::EmailsToSend,
    ];

    /// Key string in the cache
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorksCreate => "CACHED-WORKS-CREATE",
            Self::WorksUpdate => "CACHED-WORKS-UPDATE",
            Self::ChaptersCreate => "CACHED-CHAPTERS-CREATE",
            Self::ChaptersUpdate => "CACHED-CHAPTERS-UPDATE",
            Self::CommentsCreate => "CACHED-COMMENTS-CREATE",
            Self::CommentsUpdate => "CACHED-COMMENTS-UPDATE",
            Self::TagsCreate => "CACHED-TAGS-CREATE",
            Self::TagsUpdate => "CACHED-TAGS-UPDATE",
            Self::UserTagsCreate => "CACHED-USERTAGS-CREATE",
            Self::UserTagsDelete => "CACHED-USERTAGS-DELETE",
            Self::WorkLikesCreate => "CACHED-WORKLIKES-CREATE",
            Self::WorkLikesDelete => "CACHED-WORKLIKES-DELETE",
            Self::WorkTagsCreate => "CACHED-WORKTAGS-CREATE",
            Self::WorkTagsDelete => "CACHED-WORKTAGS-DELETE",
            Self::EmailsToSend => "EMAILS-TO-SEND",
        }
    }

    /// Worker name, `<family>.<operation>`, as used in config and logs
    pub fn worker_name(&self) -> &'static str {
        match self {
            Self::WorksCreate => "works.create",
            Self::WorksUpdate => "works.update",
            Self::ChaptersCreate => "chapters.create",
            Self::ChaptersUpdate => "chapters.update",
            Self::CommentsCreate => "comments.create",
            Self::CommentsUpdate => "comments.update",
            Self::TagsCreate => "tags.create",
            Self::TagsUpdate => "tags.update",
            Self::UserTagsCreate => "user_tags.create",
            Self::UserTagsDelete => "user_tags.delete",
            Self::WorkLikesCreate => "work_likes.create",
            Self::WorkLikesDelete => "work_likes.delete",
            Self::WorkTagsCreate => "work_tags.create",
            Self::WorkTagsDelete => "work_tags.delete",
            Self::EmailsToSend => "emails.send",
        }
    }
}

impl fmt::Display for BufferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BufferKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s || key.worker_name() == s)
            .ok_or_else(|| format!("unknown buffer key: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let names: HashSet<_> = BufferKey::ALL.iter().map(|k| k.as_str()).collect();
        let workers: HashSet<_> = BufferKey::ALL.iter().map(|k| k.worker_name()).collect();
        assert_eq!(names.len(), BufferKey::ALL.len());
        assert_eq!(workers.len(), BufferKey::ALL.len());
    }

    #[test]
    fn parses_either_form() {
        assert_eq!(
            "CACHED-WORKLIKES-DELETE".parse::<BufferKey>(),
            Ok(BufferKey::WorkLikesDelete)
        );
        assert_eq!("emails.send".parse::<BufferKey>(), Ok(BufferKey::EmailsToSend));
        assert!("CACHED-USERS-CREATE".parse::<BufferKey>().is_err());
    }
}
