//! Work writes, including tag links, the first chapter, and likes

use super::chapter::NewChapter;
use super::{committed, Receipt, ServiceContext};
use crate::buffer::{BufferKey, Staged};
use crate::domain::{Category, Patch, Record, Work, WorkLike, WorkPatch, WorkTag};
use crate::error::{QuireError, QuireResult};
use crate::storage::{LinkStore, StoragePort};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;
use uuid::Uuid;

/// Request to publish a work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWork {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,

    /// URL of the already uploaded cover
    pub cover_url: String,

    #[serde(default)]
    pub tag_ids: Vec<Uuid>,

    /// Chapter published together with the work
    #[serde(default)]
    pub first_chapter: Option<NewChapter>,
}

#[derive(Clone)]
pub struct WorkService {
    ctx: ServiceContext,
}

impl WorkService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Buffer a new work with its tag links and optional first chapter, and
    /// email the author
    ///
    /// Everything is validated before anything is buffered, and the work,
    /// its links, the chapter and the email are buffered together or not at
    /// all.
    pub async fn create(&self, request: &NewWork) -> QuireResult<Receipt<Work>> {
        let work = Work::new(
            Uuid::new_v4(),
            request.user_id,
            request.title.clone(),
            request.description.clone(),
            request.category,
            request.cover_url.clone(),
        )?;
        let links = tag_links(work.id, &request.tag_ids)?;
        let chapter = request
            .first_chapter
            .as_ref()
            .map(|c| c.build(work.id))
            .transpose()?;
        let author = self.ctx.user(work.user_id).await?;

        let mut staged = Staged::new();
        staged.push(BufferKey::WorksCreate, &work)?;
        staged.push_all(BufferKey::WorkTagsCreate, &links)?;
        if let Some(chapter) = &chapter {
            staged.push(BufferKey::ChaptersCreate, chapter)?;
        }

        let message = self.ctx.notifier.templates().work_created(&author, &work);
        self.ctx.notifier.notify(staged, &author, &message).await?;

        Ok(Receipt::pending(BufferKey::WorksCreate, work))
    }

    /// Buffer a change to a committed work
    ///
    /// With `tag_ids`, the work's tag set is replaced: only links that
    /// actually change are buffered, so the create and delete queues never
    /// carry the same link.
    pub async fn update(
        &self,
        patch: WorkPatch,
        tag_ids: Option<&[Uuid]>,
    ) -> QuireResult<Receipt<Work>> {
        let current = self.get(patch.id).await?;
        patch.apply_to(&mut current.clone())?;

        let changes = match tag_ids {
            Some(tag_ids) => Some(self.tag_diff(current.id, tag_ids).await?),
            None => None,
        };

        let mut staged = Staged::new();
        staged.push(BufferKey::WorksUpdate, &patch)?;
        if let Some((removed, added)) = changes {
            debug!(
                "Work {} tags: {} removed, {} added",
                current.id,
                removed.len(),
                added.len()
            );
            staged.push_all(BufferKey::WorkTagsDelete, &removed)?;
            staged.push_all(BufferKey::WorkTagsCreate, &added)?;
        }
        self.ctx.buffer.commit(staged).await?;

        Ok(Receipt::pending(BufferKey::WorksUpdate, current))
    }

    /// Like a work on behalf of `user_id`
    pub async fn like(&self, user_id: Uuid, work_id: Uuid) -> QuireResult<Receipt<WorkLike>> {
        let like = WorkLike::new(user_id, work_id)?;
        if self.has_liked(&like).await? {
            return Err(QuireError::ToggleConflict(
                "User has already liked this work".to_string(),
            ));
        }

        let work = self.get(work_id).await?;
        let user = self.ctx.user(user_id).await?;

        let mut staged = Staged::new();
        staged.push(BufferKey::WorkLikesCreate, &like)?;
        let message = self.ctx.notifier.templates().work_liked(&user, &work);
        self.ctx.notifier.notify(staged, &user, &message).await?;

        Ok(Receipt::pending(BufferKey::WorkLikesCreate, like))
    }

    /// Remove a like on behalf of `user_id`
    pub async fn unlike(&self, user_id: Uuid, work_id: Uuid) -> QuireResult<Receipt<WorkLike>> {
        let like = WorkLike::new(user_id, work_id)?;
        if !self.has_liked(&like).await? {
            return Err(QuireError::ToggleConflict(
                "User has not liked this work".to_string(),
            ));
        }

        let work = self.get(work_id).await?;
        let user = self.ctx.user(user_id).await?;

        let mut staged = Staged::new();
        staged.push(BufferKey::WorkLikesDelete, &like)?;
        let message = self.ctx.notifier.templates().work_unliked(&user, &work);
        self.ctx.notifier.notify(staged, &user, &message).await?;

        Ok(Receipt::pending(BufferKey::WorkLikesDelete, like))
    }

    pub async fn get(&self, id: Uuid) -> QuireResult<Work> {
        committed(self.ctx.stores.works.as_ref(), id).await
    }

    /// Committed likes on a work
    ///
    /// Likes still waiting in a buffer are not counted.
    pub async fn likes(&self, work_id: Uuid) -> QuireResult<usize> {
        self.get(work_id).await?;
        Ok(self.ctx.stores.work_likes.links_to(work_id).await?.len())
    }

    async fn has_liked(&self, like: &WorkLike) -> QuireResult<bool> {
        let found = self.ctx.stores.work_likes.existing(&[like.key()]).await?;
        Ok(!found.is_empty())
    }

    /// Links to remove and links to add to move `work_id` to `tag_ids`
    async fn tag_diff(
        &self,
        work_id: Uuid,
        tag_ids: &[Uuid],
    ) -> QuireResult<(Vec<WorkTag>, Vec<WorkTag>)> {
        let wanted: BTreeSet<Uuid> = tag_ids.iter().copied().collect();
        let current = self.ctx.stores.work_tags.links_from(work_id).await?;
        let have: BTreeSet<Uuid> = current.iter().map(|link| link.tag_id).collect();

        let removed = current
            .into_iter()
            .filter(|link| !wanted.contains(&link.tag_id))
            .collect();
        let added = tag_links(
            work_id,
            &wanted.difference(&have).copied().collect::<Vec<_>>(),
        )?;
        Ok((removed, added))
    }
}

fn tag_links(work_id: Uuid, tag_ids: &[Uuid]) -> QuireResult<Vec<WorkTag>> {
    let mut seen = BTreeSet::new();
    tag_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|tag_id| WorkTag::new(work_id, *tag_id))
        .collect()
}
