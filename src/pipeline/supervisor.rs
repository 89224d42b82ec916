//! Wiring and lifecycle of the full set of flush workers

use super::worker::{self, FlushWorker, Worker};
use super::{CreateDrain, DeleteDrain, Drain, OutboxDrain, TickOutcome, UpdateDrain};
use crate::buffer::{BufferKey, MutationBuffer};
use crate::config::Config;
use crate::domain::{
    Chapter, ChapterPatch, Comment, CommentPatch, Tag, TagPatch, UserTag, Work, WorkLike, WorkPatch,
    WorkTag,
};
use crate::error::QuireResult;
use crate::notify::EmailSender;
use crate::storage::Stores;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

/// Every flush worker, started and stopped together
pub struct Pipeline {
    workers: Vec<Arc<dyn Worker>>,
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

fn flush<D: Drain>(drain: D, buffer: &MutationBuffer, config: &Config) -> Arc<dyn Worker> {
    let interval = config.interval_for(drain.key());
    Arc::new(FlushWorker::new(drain, buffer.clone(), interval))
}

impl Pipeline {
    /// Build one worker per buffer key
    ///
    /// Fails if the configured TTL does not outlive every worker interval.
    pub fn new(
        config: &Config,
        buffer: MutationBuffer,
        stores: &Stores,
        mailer: Arc<dyn EmailSender>,
    ) -> QuireResult<Self> {
        config.validate()?;

        let b = &buffer;
        let workers = vec![
            flush(
                CreateDrain::<Work, _>::new(BufferKey::WorksCreate, stores.works.clone()),
                b,
                config,
            ),
            flush(
                UpdateDrain::<Work, WorkPatch, _>::new(BufferKey::WorksUpdate, stores.works.clone()),
                b,
                config,
            ),
            flush(
                CreateDrain::<Chapter, _>::new(BufferKey::ChaptersCreate, stores.chapters.clone()),
                b,
                config,
            ),
            flush(
                UpdateDrain::<Chapter, ChapterPatch, _>::new(
                    BufferKey::ChaptersUpdate,
                    stores.chapters.clone(),
                ),
                b,
                config,
            ),
            flush(
                CreateDrain::<Comment, _>::new(BufferKey::CommentsCreate, stores.comments.clone()),
                b,
                config,
            ),
            flush(
                UpdateDrain::<Comment, CommentPatch, _>::new(
                    BufferKey::CommentsUpdate,
                    stores.comments.clone(),
                ),
                b,
                config,
            ),
            flush(
                CreateDrain::<Tag, _>::new(BufferKey::TagsCreate, stores.tags.clone()),
                b,
                config,
            ),
            flush(
                UpdateDrain::<Tag, TagPatch, _>::new(BufferKey::TagsUpdate, stores.tags.clone()),
                b,
                config,
            ),
            flush(
                CreateDrain::<UserTag, _>::new(BufferKey::UserTagsCreate, stores.user_tags.clone()),
                b,
                config,
            ),
            flush(
                DeleteDrain::<UserTag, _>::new(BufferKey::UserTagsDelete, stores.user_tags.clone()),
                b,
                config,
            ),
            flush(
                CreateDrain::<WorkLike, _>::new(BufferKey::WorkLikesCreate, stores.work_likes.clone()),
                b,
                config,
            ),
            flush(
                DeleteDrain::<WorkLike, _>::new(BufferKey::WorkLikesDelete, stores.work_likes.clone()),
                b,
                config,
            ),
            flush(
                CreateDrain::<WorkTag, _>::new(BufferKey::WorkTagsCreate, stores.work_tags.clone()),
                b,
                config,
            ),
            flush(
                DeleteDrain::<WorkTag, _>::new(BufferKey::WorkTagsDelete, stores.work_tags.clone()),
                b,
                config,
            ),
            flush(OutboxDrain::new(mailer), b, config),
        ];

        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            workers,
            shutdown,
            handles: Vec::new(),
        })
    }

    /// Buffer key and interval of every worker, in start order
    pub fn schedule(&self) -> Vec<(BufferKey, Duration)> {
        self.workers.iter().map(|w| (w.key(), w.interval())).collect()
    }

    /// Start every worker on the current runtime
    pub fn spawn(&mut self) {
        for worker in &self.workers {
            let handle = tokio::spawn(worker::run(worker.clone(), self.shutdown.subscribe()));
            self.handles.push(handle);
        }
        info!("Started {} flush workers", self.handles.len());
    }

    /// Run a single tick of every worker, in start order
    pub async fn run_once(&self) -> Vec<(BufferKey, QuireResult<TickOutcome>)> {
        let mut results = Vec::with_capacity(self.workers.len());
        for worker in &self.workers {
            let key = worker.key();
            let outcome = worker
                .tick()
                .instrument(info_span!("flush", key = %key))
                .await;
            results.push((key, outcome));
        }
        results
    }

    /// Signal every worker to stop and wait for in-flight ticks to finish
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            debug!("No running workers to signal");
        }
        for result in join_all(self.handles).await {
            if let Err(e) = result {
                error!("Worker task failed: {}", e);
            }
        }
        info!("All flush workers stopped");
    }
}
