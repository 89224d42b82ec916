//! Fan-out of one message to a user's enabled channels

use super::{ChatNotifier, EmailOutbox, Message, Templates};
use crate::buffer::Staged;
use crate::domain::User;
use crate::error::QuireResult;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct Notifier {
    outbox: EmailOutbox,
    chat: Arc<dyn ChatNotifier>,
    templates: Templates,
}

impl Notifier {
    pub fn new(outbox: EmailOutbox, chat: Arc<dyn ChatNotifier>, templates: Templates) -> Self {
        Self {
            outbox,
            chat,
            templates,
        }
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Buffer `staged` together with the user's email, then send the chat
    /// message, per the user's settings
    ///
    /// The staged writes and the email reach the cache together or not at
    /// all. A chat failure is only logged.
    pub async fn notify(&self, mut staged: Staged, user: &User, message: &Message) -> QuireResult<()> {
        if user.notify_email {
            self.outbox
                .stage(&mut staged, &user.email, &message.subject, &message.html)?;
        }
        self.outbox.buffer().commit(staged).await?;

        if let (true, Some(chat_id)) = (user.notify_telegram, user.telegram_id.as_deref()) {
            if let Err(e) = self
                .chat
                .send_message(chat_id, &message.chat_text, message.link.as_ref())
                .await
            {
                warn!("Chat notification to user {} failed: {}", user.id, e);
            }
        }

        Ok(())
    }
}
