//! Users as seen by the pipeline: a notification target
//!
//! Registration and profile edits live outside this crate; the pipeline
//! only reads users to address notifications.

use super::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,

    /// Linked chat id, if the user connected the bot
    #[serde(default)]
    pub telegram_id: Option<String>,

    /// Receive email notifications
    #[serde(default = "default_true")]
    pub notify_email: bool,

    /// Receive chat notifications
    #[serde(default)]
    pub notify_telegram: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    /// New user with email notifications on and no chat link
    pub fn new(id: Uuid, nickname: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            email: email.into(),
            telegram_id: None,
            notify_email: true,
            notify_telegram: false,
        }
    }

    /// Link a chat id and turn chat notifications on
    pub fn with_telegram(mut self, chat_id: impl Into<String>) -> Self {
        self.telegram_id = Some(chat_id.into());
        self.notify_telegram = true;
        self
    }
}

impl Record for User {
    type Key = Uuid;
    const KIND: &'static str = "user";

    fn key(&self) -> Uuid {
        self.id
    }
}
