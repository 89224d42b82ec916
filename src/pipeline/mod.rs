//! Flush workers: one generic loop per buffer key
//!
//! A worker tick reads the whole buffer, hands the decoded items to the
//! key's [`Drain`], and evicts exactly the prefix the drain reports as
//! consumed. Anything that fails stays queued and is retried verbatim on
//! the next tick.
//!
//! # Strategies
//!
//! | Drain | Keys | Apply |
//! |-------|------|-------|
//! | `CreateDrain` | `*-CREATE` | dedupe, skip committed, bulk add |
//! | `UpdateDrain` | `*-UPDATE` | get, patch, bulk update |
//! | `DeleteDrain` | `*-DELETE` | bulk delete by key |
//! | `OutboxDrain` | `EMAILS-TO-SEND` | send one by one |

pub mod drains;
pub mod supervisor;
pub mod worker;

pub use drains::{CreateDrain, DeleteDrain, OutboxDrain, UpdateDrain};
pub use supervisor::Pipeline;
pub use worker::{FlushWorker, Worker};

use crate::buffer::BufferKey;
use crate::error::QuireResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// What a drain did with a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Applied {
    /// Items to evict from the head of the buffer
    pub consumed: usize,

    /// Consumed items that needed no storage change
    pub skipped: usize,
}

/// Result of one worker tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Buffer was empty; storage was not touched
    Idle,
    Flushed(Applied),
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Flushed(applied) if applied.skipped > 0 => write!(
                f,
                "flushed {} ({} skipped)",
                applied.consumed, applied.skipped
            ),
            Self::Flushed(applied) => write!(f, "flushed {}", applied.consumed),
        }
    }
}

/// Per-key flush strategy
#[async_trait]
pub trait Drain: Send + Sync + 'static {
    /// Payload type held in the buffer
    type Item: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static;

    /// Buffer this drain empties
    fn key(&self) -> BufferKey;

    /// Apply a batch in queue order
    ///
    /// On success every item counts as consumed. A drain that can apply a
    /// prefix on its own reports it through `QuireError::PartialFlush`.
    async fn apply(&self, items: Vec<Self::Item>) -> QuireResult<Applied>;
}
