//! Chapter writes

use super::{committed, Receipt, ServiceContext};
use crate::buffer::BufferKey;
use crate::domain::{Chapter, ChapterPatch, Patch};
use crate::error::QuireResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to add a chapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChapter {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
}

impl NewChapter {
    /// Validated chapter with a fresh id under `work_id`
    pub(crate) fn build(&self, work_id: Uuid) -> QuireResult<Chapter> {
        Chapter::new(
            Uuid::new_v4(),
            work_id,
            self.user_id,
            self.title.clone(),
            self.description.clone(),
            self.content.clone(),
        )
    }
}

#[derive(Clone)]
pub struct ChapterService {
    ctx: ServiceContext,
}

impl ChapterService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Buffer a new chapter of `work_id`
    ///
    /// The work may itself still be buffered.
    pub async fn create(&self, work_id: Uuid, request: &NewChapter) -> QuireResult<Receipt<Chapter>> {
        let chapter = request.build(work_id)?;
        self.ctx
            .buffer
            .append(BufferKey::ChaptersCreate, &chapter)
            .await?;
        Ok(Receipt::pending(BufferKey::ChaptersCreate, chapter))
    }

    /// Buffer a change to a committed chapter
    pub async fn update(&self, patch: ChapterPatch) -> QuireResult<Receipt<Chapter>> {
        let current = self.get(patch.id).await?;
        patch.apply_to(&mut current.clone())?;

        self.ctx
            .buffer
            .append(BufferKey::ChaptersUpdate, &patch)
            .await?;
        Ok(Receipt::pending(BufferKey::ChaptersUpdate, current))
    }

    pub async fn get(&self, id: Uuid) -> QuireResult<Chapter> {
        committed(self.ctx.stores.chapters.as_ref(), id).await
    }
}
