//! The flush loop shared by every buffer key

use super::{Drain, TickOutcome};
use crate::buffer::{BufferKey, MutationBuffer};
use crate::error::{QuireError, QuireResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// A periodically ticking worker, independent of its payload type
#[async_trait]
pub trait Worker: Send + Sync {
    fn key(&self) -> BufferKey;

    fn interval(&self) -> Duration;

    /// Run one snapshot, apply, evict cycle
    async fn tick(&self) -> QuireResult<TickOutcome>;
}

/// Drains one buffer through its strategy
pub struct FlushWorker<D: Drain> {
    drain: D,
    buffer: MutationBuffer,
    interval: Duration,
}

impl<D: Drain> FlushWorker<D> {
    pub fn new(drain: D, buffer: MutationBuffer, interval: Duration) -> Self {
        Self {
            drain,
            buffer,
            interval,
        }
    }
}

#[async_trait]
impl<D: Drain> Worker for FlushWorker<D> {
    fn key(&self) -> BufferKey {
        self.drain.key()
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&self) -> QuireResult<TickOutcome> {
        let key = self.drain.key();
        let batch = self.buffer.snapshot::<D::Item>(key).await?;
        if batch.is_empty() {
            debug!("Nothing to flush");
            return Ok(TickOutcome::Idle);
        }

        if let Some(oldest) = batch.oldest() {
            debug!(
                "Flushing {} item(s), oldest queued {}s ago",
                batch.len(),
                (Utc::now() - oldest).num_seconds()
            );
        }

        match self.drain.apply(batch.into_items()).await {
            Ok(applied) => {
                self.buffer.evict(key, applied.consumed).await?;
                info!(
                    consumed = applied.consumed,
                    skipped = applied.skipped,
                    "Flushed {}",
                    key
                );
                Ok(TickOutcome::Flushed(applied))
            }
            Err(e) => {
                if let QuireError::PartialFlush { consumed, .. } = &e {
                    self.buffer.evict(key, *consumed).await?;
                }
                Err(e)
            }
        }
    }
}

/// Tick `worker` every interval until `shutdown` turns true
///
/// Failed ticks are logged and the batch stays queued for the next tick.
/// A tick in progress finishes before shutdown is observed.
pub async fn run(worker: Arc<dyn Worker>, mut shutdown: watch::Receiver<bool>) {
    let span = info_span!("flush", key = %worker.key());
    async move {
        info!("Worker started, interval {}s", worker.interval().as_secs());
        loop {
            let stopping = *shutdown.borrow();
            if stopping {
                break;
            }

            match worker.tick().await {
                Ok(_) => {}
                Err(e) if e.is_retryable() => warn!("Flush failed, will retry: {}", e),
                Err(e) => error!("Flush failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(worker.interval()) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("Worker stopped");
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferMode;
    use crate::cache::MemoryCache;
    use crate::domain::{AgeRestriction, Tag};
    use crate::pipeline::{Applied, CreateDrain};
    use crate::storage::MemoryStore;
    use uuid::Uuid;

    fn setup() -> (Arc<MemoryStore>, MutationBuffer, FlushWorker<CreateDrain<Tag, MemoryStore>>) {
        let store = Arc::new(MemoryStore::new());
        let buffer = MutationBuffer::new(
            Arc::new(MemoryCache::new()),
            Duration::from_secs(65),
            BufferMode::List,
        );
        let worker = FlushWorker::new(
            CreateDrain::new(BufferKey::TagsCreate, store.clone()),
            buffer.clone(),
            Duration::from_secs(60),
        );
        (store, buffer, worker)
    }

    fn tag(name: &str) -> Tag {
        Tag::new(Uuid::new_v4(), name, AgeRestriction::GeneralAudience, "Some tag").unwrap()
    }

    #[tokio::test]
    async fn empty_buffer_is_idle() {
        let (store, _, worker) = setup();
        assert_eq!(worker.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(store.commits(), 0);
    }

    #[tokio::test]
    async fn tick_commits_and_evicts() {
        let (store, buffer, worker) = setup();
        buffer.append(BufferKey::TagsCreate, &tag("x1")).await.unwrap();
        buffer.append(BufferKey::TagsCreate, &tag("x2")).await.unwrap();

        let outcome = worker.tick().await.unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Flushed(Applied {
                consumed: 2,
                skipped: 0
            })
        );
        assert_eq!(store.all::<Tag>().unwrap().len(), 2);
        assert_eq!(buffer.pending(BufferKey::TagsCreate).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn storage_failure_keeps_the_batch() {
        let (store, buffer, worker) = setup();
        buffer.append(BufferKey::TagsCreate, &tag("x1")).await.unwrap();
        store.set_offline(true);

        assert!(worker.tick().await.unwrap_err().is_retryable());
        assert_eq!(buffer.pending(BufferKey::TagsCreate).await.unwrap(), 1);

        store.set_offline(false);
        worker.tick().await.unwrap();
        assert_eq!(store.all::<Tag>().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_shutdown() {
        let (store, buffer, worker) = setup();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run(Arc::new(worker), rx));

        buffer.append(BufferKey::TagsCreate, &tag("later")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(store.all::<Tag>().unwrap().len(), 1);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
