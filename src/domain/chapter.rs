//! Chapters of a work

use super::validate::Rules;
use super::{Patch, Record};
use crate::error::QuireResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chapter of a work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub work_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
}

impl Chapter {
    /// Create a validated chapter
    pub fn new(
        id: Uuid,
        work_id: Uuid,
        user_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> QuireResult<Self> {
        let chapter = Self {
            id,
            work_id,
            user_id,
            title: title.into(),
            description: description.into(),
            content: content.into(),
        };
        chapter.validate()?;
        Ok(chapter)
    }

    /// Replace the editable fields, re-validating before anything changes
    pub fn update(&mut self, title: String, description: String, content: String) -> QuireResult<()> {
        let candidate = Self {
            title,
            description,
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
            .id("work_id", self.work_id)
            .id("user_id", self.user_id)
            .text("title", &self.title, 2, 30)
            .text("description", &self.description, 1, 500)
            .text("content", &self.content, 1, 25_000)
            .finish()
    }
}

impl Record for Chapter {
    type Key = Uuid;
    const KIND: &'static str = "chapter";

    fn key(&self) -> Uuid {
        self.id
    }
}

/// Sparse update of a chapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterPatch {
    pub id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Patch<Chapter> for ChapterPatch {
    fn target(&self) -> Uuid {
        self.id
    }

    fn apply_to(&self, chapter: &mut Chapter) -> QuireResult<()> {
        chapter.update(
            self.title.clone().unwrap_or_else(|| chapter.title.clone()),
            self.description
                .clone()
                .unwrap_or_else(|| chapter.description.clone()),
            self.content.clone().unwrap_or_else(|| chapter.content.clone()),
        )
    }
}
