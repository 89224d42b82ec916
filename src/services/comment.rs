//! Comment writes

use super::{committed, Receipt, ServiceContext};
use crate::buffer::BufferKey;
use crate::domain::{Comment, CommentPatch, Patch};
use crate::error::QuireResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub user_id: Uuid,
    pub chapter_id: Uuid,
    pub content: String,
}

#[derive(Clone)]
pub struct CommentService {
    ctx: ServiceContext,
}

impl CommentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create(&self, request: &NewComment) -> QuireResult<Receipt<Comment>> {
        let comment = Comment::new(
            Uuid::new_v4(),
            request.user_id,
            request.chapter_id,
            request.content.clone(),
        )?;
        self.ctx
            .buffer
            .append(BufferKey::CommentsCreate, &comment)
            .await?;
        Ok(Receipt::pending(BufferKey::CommentsCreate, comment))
    }

    pub async fn update(&self, patch: CommentPatch) -> QuireResult<Receipt<Comment>> {
        let current = self.get(patch.id).await?;
        patch.apply_to(&mut current.clone())?;

        self.ctx
            .buffer
            .append(BufferKey::CommentsUpdate, &patch)
            .await?;
        Ok(Receipt::pending(BufferKey::CommentsUpdate, current))
    }

    pub async fn get(&self, id: Uuid) -> QuireResult<Comment> {
        committed(self.ctx.stores.comments.as_ref(), id).await
    }
}
