//! User notifications: an email outbox drained by a flush worker, and
//! best-effort chat messages sent inline
//!
//! SMTP and chat-bot clients sit behind the [`EmailSender`] and
//! [`ChatNotifier`] ports. The crate ships logging adapters for both.

pub mod adapters;
pub mod notifier;
pub mod outbox;
pub mod templates;

pub use adapters::{LogChat, LogMailer};
pub use notifier::Notifier;
pub use outbox::{EmailOutbox, OutboundEmail};
pub use templates::{Message, Templates};

use crate::error::QuireResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Delivers one HTML email
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> QuireResult<()>;
}

/// Button attached to a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLink {
    pub text: String,
    pub url: String,
}

/// Sends a chat message to a linked chat id
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str, link: Option<&ChatLink>) -> QuireResult<()>;
}
