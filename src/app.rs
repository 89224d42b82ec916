//! Assembly of services and flush workers over a set of adapters

use crate::buffer::MutationBuffer;
use crate::cache::{CacheStore, MemoryCache};
use crate::config::Config;
use crate::error::QuireResult;
use crate::notify::{ChatNotifier, EmailOutbox, EmailSender, LogChat, LogMailer, Notifier, Templates};
use crate::pipeline::Pipeline;
use crate::services::{ChapterService, CommentService, ServiceContext, TagService, WorkService};
use crate::storage::{MemoryStore, Stores};
use std::sync::Arc;
use tracing::debug;

/// External systems the pipeline talks to
#[derive(Clone)]
pub struct Adapters {
    pub cache: Arc<dyn CacheStore>,
    pub stores: Stores,
    pub mailer: Arc<dyn EmailSender>,
    pub chat: Arc<dyn ChatNotifier>,
}

impl Adapters {
    /// In-process cache and store, with mail and chat written to the log
    pub fn in_memory(cache: Arc<MemoryCache>, store: Arc<MemoryStore>) -> Self {
        Self {
            cache,
            stores: Stores::shared(store),
            mailer: Arc::new(LogMailer),
            chat: Arc::new(LogChat),
        }
    }
}

/// Producer services and the worker pipeline sharing one buffer
pub struct App {
    pub buffer: MutationBuffer,
    pub works: WorkService,
    pub chapters: ChapterService,
    pub comments: CommentService,
    pub tags: TagService,
    pub pipeline: Pipeline,
}

impl App {
    /// Wire every component; fails if the configuration is inconsistent
    pub fn build(config: &Config, adapters: Adapters) -> QuireResult<Self> {
        let buffer = MutationBuffer::new(adapters.cache.clone(), config.buffer_ttl(), config.buffer.mode);
        let pipeline = Pipeline::new(config, buffer.clone(), &adapters.stores, adapters.mailer)?;

        let outbox = EmailOutbox::new(buffer.clone(), &config.mail);
        let notifier = Notifier::new(outbox, adapters.chat, Templates::new(&config.site.base_url));
        let ctx = ServiceContext::new(buffer.clone(), adapters.stores, notifier);

        debug!(
            "Wired {} cache with {} buffer mode",
            adapters.cache.backend_name(),
            config.buffer.mode
        );

        Ok(Self {
            buffer,
            works: WorkService::new(ctx.clone()),
            chapters: ChapterService::new(ctx.clone()),
            comments: CommentService::new(ctx.clone()),
            tags: TagService::new(ctx),
            pipeline,
        })
    }
}
