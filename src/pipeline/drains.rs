//! Drain strategies for creates, updates, deletes, and the email outbox

use super::{Applied, Drain};
use crate::buffer::BufferKey;
use crate::domain::{Patch, Record};
use crate::error::{QuireError, QuireResult};
use crate::notify::{EmailSender, OutboundEmail};
use crate::storage::{StoragePort, UnitOfWork};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bulk insert of buffered records
///
/// Records whose key repeats within the batch, or that are already
/// committed, are skipped. This makes replaying a batch after a crash
/// between commit and evict harmless and collapses duplicate toggles.
pub struct CreateDrain<T: Record, S: ?Sized = dyn StoragePort<T>> {
    key: BufferKey,
    store: Arc<S>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record, S: ?Sized + StoragePort<T>> CreateDrain<T, S> {
    pub fn new(key: BufferKey, store: Arc<S>) -> Self {
        Self {
            key,
            store,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T, S> Drain for CreateDrain<T, S>
where
    T: Record,
    S: ?Sized + StoragePort<T> + 'static,
{
    type Item = T;

    fn key(&self) -> BufferKey {
        self.key
    }

    async fn apply(&self, items: Vec<T>) -> QuireResult<Applied> {
        let consumed = items.len();

        let mut seen = BTreeSet::new();
        let unique: Vec<T> = items
            .into_iter()
            .filter(|record| seen.insert(record.key()))
            .collect();

        let keys: Vec<T::Key> = unique.iter().map(Record::key).collect();
        let committed: BTreeSet<T::Key> = self.store.existing(&keys).await?.into_iter().collect();
        let fresh: Vec<T> = unique
            .into_iter()
            .filter(|record| !committed.contains(&record.key()))
            .collect();

        let skipped = consumed - fresh.len();
        if skipped > 0 {
            warn!("Skipping {} duplicate or already committed {}(s)", skipped, T::KIND);
        }

        if !fresh.is_empty() {
            let mut unit = UnitOfWork::new();
            unit.bulk_add(fresh);
            self.store.commit(unit).await?;
        }

        Ok(Applied { consumed, skipped })
    }
}

/// Bulk update from buffered patches
///
/// Patches apply in queue order. Several patches to one record build on
/// each other through an in-cycle working copy, so the last one wins per
/// field. A missing target or an invalid result aborts the whole cycle.
pub struct UpdateDrain<T: Record, P, S: ?Sized = dyn StoragePort<T>> {
    key: BufferKey,
    store: Arc<S>,
    _types: PhantomData<fn() -> (T, P)>,
}

impl<T: Record, P: Patch<T>, S: ?Sized + StoragePort<T>> UpdateDrain<T, P, S> {
    pub fn new(key: BufferKey, store: Arc<S>) -> Self {
        Self {
            key,
            store,
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<T, P, S> Drain for UpdateDrain<T, P, S>
where
    T: Record,
    P: Patch<T>,
    S: ?Sized + StoragePort<T> + 'static,
{
    type Item = P;

    fn key(&self) -> BufferKey {
        self.key
    }

    async fn apply(&self, patches: Vec<P>) -> QuireResult<Applied> {
        let consumed = patches.len();
        let mut working: BTreeMap<T::Key, T> = BTreeMap::new();

        for patch in &patches {
            let target = patch.target();
            if !working.contains_key(&target) {
                let current = self
                    .store
                    .get_by_id(&target)
                    .await?
                    .ok_or_else(|| QuireError::not_found(T::KIND, format!("{:?}", target)))?;
                working.insert(target.clone(), current);
            }
            if let Some(record) = working.get_mut(&target) {
                patch.apply_to(record)?;
            }
        }

        debug!("Updating {} {}(s) from {} patch(es)", working.len(), T::KIND, consumed);
        let mut unit = UnitOfWork::new();
        unit.bulk_update(working.into_values());
        self.store.commit(unit).await?;

        Ok(Applied {
            consumed,
            skipped: 0,
        })
    }
}

/// Bulk delete of buffered records by key
pub struct DeleteDrain<T: Record, S: ?Sized = dyn StoragePort<T>> {
    key: BufferKey,
    store: Arc<S>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record, S: ?Sized + StoragePort<T>> DeleteDrain<T, S> {
    pub fn new(key: BufferKey, store: Arc<S>) -> Self {
        Self {
            key,
            store,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T, S> Drain for DeleteDrain<T, S>
where
    T: Record,
    S: ?Sized + StoragePort<T> + 'static,
{
    type Item = T;

    fn key(&self) -> BufferKey {
        self.key
    }

    async fn apply(&self, items: Vec<T>) -> QuireResult<Applied> {
        let consumed = items.len();
        let mut unit = UnitOfWork::new();
        unit.bulk_delete(items.iter().map(Record::key));
        self.store.commit(unit).await?;

        Ok(Applied {
            consumed,
            skipped: 0,
        })
    }
}

/// Sends queued emails one at a time
///
/// Emails are not transactional: once one is sent it cannot be recalled, so
/// a failure mid-batch reports the sent prefix as consumed.
pub struct OutboxDrain {
    mailer: Arc<dyn EmailSender>,
}

impl OutboxDrain {
    pub fn new(mailer: Arc<dyn EmailSender>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Drain for OutboxDrain {
    type Item = OutboundEmail;

    fn key(&self) -> BufferKey {
        BufferKey::EmailsToSend
    }

    async fn apply(&self, emails: Vec<OutboundEmail>) -> QuireResult<Applied> {
        for (sent, email) in emails.iter().enumerate() {
            if let Err(e) = self.mailer.send(email).await {
                return Err(QuireError::PartialFlush {
                    key: BufferKey::EmailsToSend.as_str().to_string(),
                    consumed: sent,
                    source: Box::new(e),
                });
            }
        }

        Ok(Applied {
            consumed: emails.len(),
            skipped: 0,
        })
    }
}
