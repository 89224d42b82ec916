//! Adapters that log instead of delivering

use super::{ChatLink, ChatNotifier, EmailSender, OutboundEmail};
use crate::error::QuireResult;
use async_trait::async_trait;
use tracing::info;

/// Email sender that records each email in the log
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> QuireResult<()> {
        info!(
            from = %email.sender_email,
            to = %email.to,
            "Email: {}",
            email.subject
        );
        Ok(())
    }
}

/// Chat notifier that records each message in the log
#[derive(Debug, Default, Clone)]
pub struct LogChat;

#[async_trait]
impl ChatNotifier for LogChat {
    async fn send_message(&self, chat_id: &str, text: &str, link: Option<&ChatLink>) -> QuireResult<()> {
        match link {
            Some(link) => info!(chat_id, url = %link.url, "Chat: {}", text),
            None => info!(chat_id, "Chat: {}", text),
        }
        Ok(())
    }
}
