//! Tag writes and tag follows

use super::{committed, Receipt, ServiceContext};
use crate::buffer::{BufferKey, Staged};
use crate::domain::{AgeRestriction, Patch, Record, Tag, TagPatch, UserTag};
use crate::error::{QuireError, QuireResult};
use crate::storage::StoragePort;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub age_restriction: AgeRestriction,
    pub description: String,
}

#[derive(Clone)]
pub struct TagService {
    ctx: ServiceContext,
}

impl TagService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create(&self, request: &NewTag) -> QuireResult<Receipt<Tag>> {
        let tag = Tag::new(
            Uuid::new_v4(),
            request.name.clone(),
            request.age_restriction,
            request.description.clone(),
        )?;
        self.ctx.buffer.append(BufferKey::TagsCreate, &tag).await?;
        Ok(Receipt::pending(BufferKey::TagsCreate, tag))
    }

    pub async fn update(&self, patch: TagPatch) -> QuireResult<Receipt<Tag>> {
        let current = self.get(patch.id).await?;
        patch.apply_to(&mut current.clone())?;

        self.ctx.buffer.append(BufferKey::TagsUpdate, &patch).await?;
        Ok(Receipt::pending(BufferKey::TagsUpdate, current))
    }

    /// Follow a tag
    ///
    /// The check sees committed follows only; a follow still in the buffer
    /// is collapsed by the flush worker.
    pub async fn follow(&self, user_id: Uuid, tag_id: Uuid) -> QuireResult<Receipt<UserTag>> {
        let link = UserTag::new(user_id, tag_id)?;
        if self.is_following(&link).await? {
            return Err(QuireError::ToggleConflict(
                "User is already following this tag".to_string(),
            ));
        }

        let tag = self.get(tag_id).await?;
        let user = self.ctx.user(user_id).await?;

        let mut staged = Staged::new();
        staged.push(BufferKey::UserTagsCreate, &link)?;
        let message = self.ctx.notifier.templates().tag_followed(&user, &tag);
        self.ctx.notifier.notify(staged, &user, &message).await?;

        Ok(Receipt::pending(BufferKey::UserTagsCreate, link))
    }

    pub async fn unfollow(&self, user_id: Uuid, tag_id: Uuid) -> QuireResult<Receipt<UserTag>> {
        let link = UserTag::new(user_id, tag_id)?;
        if !self.is_following(&link).await? {
            return Err(QuireError::ToggleConflict(
                "User is not following this tag".to_string(),
            ));
        }

        let tag = self.get(tag_id).await?;
        let user = self.ctx.user(user_id).await?;

        let mut staged = Staged::new();
        staged.push(BufferKey::UserTagsDelete, &link)?;
        let message = self.ctx.notifier.templates().tag_unfollowed(&user, &tag);
        self.ctx.notifier.notify(staged, &user, &message).await?;

        Ok(Receipt::pending(BufferKey::UserTagsDelete, link))
    }

    pub async fn get(&self, id: Uuid) -> QuireResult<Tag> {
        committed(self.ctx.stores.tags.as_ref(), id).await
    }

    async fn is_following(&self, link: &UserTag) -> QuireResult<bool> {
        let found = self.ctx.stores.user_tags.existing(&[link.key()]).await?;
        Ok(!found.is_empty())
    }
}
