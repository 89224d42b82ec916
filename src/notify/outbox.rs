//! Email outbox on the `EMAILS-TO-SEND` buffer

use crate::buffer::{BufferKey, MutationBuffer, Staged};
use crate::config::MailConfig;
use crate::error::QuireResult;
use serde::{Deserialize, Serialize};

/// An email waiting in the outbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub sender_name: String,
    pub sender_email: String,
    pub to: String,
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// Queues emails for the outbox worker
#[derive(Clone)]
pub struct EmailOutbox {
    buffer: MutationBuffer,
    sender_name: String,
    sender_email: String,
}

impl EmailOutbox {
    pub fn new(buffer: MutationBuffer, mail: &MailConfig) -> Self {
        Self {
            buffer,
            sender_name: mail.sender_name.clone(),
            sender_email: mail.sender_email.clone(),
        }
    }

    /// Add an email from the configured sender to `staged`
    pub fn stage(
        &self,
        staged: &mut Staged,
        to: &str,
        subject: &str,
        html: &str,
    ) -> QuireResult<OutboundEmail> {
        let email = OutboundEmail {
            sender_name: self.sender_name.clone(),
            sender_email: self.sender_email.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        };
        staged.push(BufferKey::EmailsToSend, &email)?;
        Ok(email)
    }

    /// Buffer an email from the configured sender
    pub async fn enqueue(&self, to: &str, subject: &str, html: &str) -> QuireResult<OutboundEmail> {
        let mut staged = Staged::new();
        let email = self.stage(&mut staged, to, subject, html)?;
        self.buffer.commit(staged).await?;
        Ok(email)
    }

    pub(crate) fn buffer(&self) -> &MutationBuffer {
        &self.buffer
    }
}
