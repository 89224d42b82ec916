//! Reader comments on chapters

use super::validate::Rules;
use super::{Patch, Record};
use crate::error::QuireResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub chapter_id: Uuid,
    pub content: String,
}

impl Comment {
    pub fn new(id: Uuid, user_id: Uuid, chapter_id: Uuid, content: impl Into<String>) -> QuireResult<Self> {
        let comment = Self {
            id,
            user_id,
            chapter_id,
            content: content.into(),
        };
        comment.validate()?;
        Ok(comment)
    }

    pub fn update(&mut self, content: String) -> QuireResult<()> {
        let candidate = Self {
            content,
            ..self.clone()
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    fn validate(&self) -> QuireResult<()> {
        Rules::new(Self::KIND)
            .id("id", self.id)
            .id("user_id", self.user_id)
            .id("chapter_id", self.chapter_id)
            .text("content", &self.content, 1, 2000)
            .finish()
    }
}

impl Record for Comment {
    type Key = Uuid;
    const KIND: &'static str = "comment";

    fn key(&self) -> Uuid {
        self.id
    }
}

/// New text for an existing comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPatch {
    pub id: Uuid,
    pub content: String,
}

impl Patch<Comment> for CommentPatch {
    fn target(&self) -> Uuid {
        self.id
    }

    fn apply_to(&self, comment: &mut Comment) -> QuireResult<()> {
        comment.update(self.content.clone())
    }
}
