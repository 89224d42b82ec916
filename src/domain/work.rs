//! Works: the top-level published piece

use super::primitives::Category;
use super::validate::Rules;
use super::{Patch, Record};
use crate::error::QuireResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A published work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    /// Identifier, assigned before buffering
    pub id: Uuid,

    /// Author
    pub user_id: Uuid,

    pub title: String,

    pub description: String,

    pub category: Category,

    /// Public URL of the uploaded cover image
    pub cover_url: String,

    pub published_at: DateTime<Utc>,
}

impl Work {
    /// Create a validated work
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        cover_url: impl Into<String>,
    ) -> QuireResult<Self> {
        let work = Self {
            id,
            user_id,
            title: title.into(),
            description: description.into(),
            category,
            cover_url: cover_url.into(),
            published_at: Utc::now(),
        };
        work.validate()?;
        Ok(work)
    }

    /// Replace the editable fields, re-validating before anything changes
    pub fn update(
        &mut self,
        title: String,
        description: String,
        category: Category,
        cover_url: String,
    ) -> QuireResult<()> {
        let candidate = Self {
            title,
            description,
            category,
            cover_url,
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
            .text("title", &self.title, 1, 30)
            .text("description", &self.description, 1, 500)
            .chosen("category", self.category.is_set())
            .text("cover_url", &self.cover_url, 1, 2048)
            .not_future("published_at", self.published_at)
            .finish()
    }
}

impl Record for Work {
    type Key = Uuid;
    const KIND: &'static str = "work";

    fn key(&self) -> Uuid {
        self.id
    }
}

/// Sparse update of a work; absent fields keep their committed value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkPatch {
    pub id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl Patch<Work> for WorkPatch {
    fn target(&self) -> Uuid {
        self.id
    }

    fn apply_to(&self, work: &mut Work) -> QuireResult<()> {
        work.update(
            self.title.clone().unwrap_or_else(|| work.title.clone()),
            self.description
                .clone()
                .unwrap_or_else(|| work.description.clone()),
            self.category.unwrap_or(work.category),
            self.cover_url.clone().unwrap_or_else(|| work.cover_url.clone()),
        )
    }
}
