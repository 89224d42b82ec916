//! Configuration schema for Quire
//!
//! Configuration is stored at `~/.config/quire/config.toml`

use crate::buffer::{BufferKey, BufferMode};
use crate::error::{QuireError, QuireResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Buffer layout and expiry
    pub buffer: BufferConfig,

    /// Flush worker intervals
    pub workers: WorkersConfig,

    /// Outbox sender identity
    pub mail: MailConfig,

    /// Public site used in notification links
    pub site: SiteConfig,
}

impl Config {
    /// Interval of the worker draining `key`
    pub fn interval_for(&self, key: BufferKey) -> Duration {
        Duration::from_secs(self.workers.secs_for(key))
    }

    /// TTL applied to every buffer write
    pub fn buffer_ttl(&self) -> Duration {
        Duration::from_secs(self.buffer.ttl_secs)
    }

    /// Check that every worker runs and every buffer outlives its worker's
    /// interval
    ///
    /// A buffer whose TTL is shorter than the gap between two drains can
    /// expire with items that were never applied.
    pub fn validate(&self) -> QuireResult<()> {
        for key in BufferKey::ALL {
            let interval_secs = self.workers.secs_for(key);
            if interval_secs == 0 {
                return Err(QuireError::ZeroInterval(key.worker_name().to_string()));
            }
            if self.buffer.ttl_secs <= interval_secs {
                return Err(QuireError::TimingInvariant {
                    worker: key.worker_name().to_string(),
                    ttl_secs: self.buffer.ttl_secs,
                    interval_secs,
                });
            }
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Buffer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Sliding expiry of every buffer, refreshed on each append
    pub ttl_secs: u64,

    /// `list` (atomic) or `scalar` (legacy string value)
    pub mode: BufferMode,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 65,
            mode: BufferMode::List,
        }
    }
}

/// Seconds between two ticks of each worker
///
/// Link queues share one interval for their create and delete workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub works_create_secs: u64,
    pub works_update_secs: u64,
    pub chapters_create_secs: u64,
    pub chapters_update_secs: u64,
    pub comments_create_secs: u64,
    pub comments_update_secs: u64,
    pub tags_create_secs: u64,
    pub tags_update_secs: u64,
    pub user_tags_secs: u64,
    pub work_likes_secs: u64,
    pub work_tags_secs: u64,
    pub emails_secs: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            works_create_secs: 60,
            works_update_secs: 60,
            chapters_create_secs: 60,
            chapters_update_secs: 60,
            comments_create_secs: 60,
            comments_update_secs: 60,
            tags_create_secs: 60,
            tags_update_secs: 60,
            user_tags_secs: 20,
            work_likes_secs: 20,
            work_tags_secs: 20,
            emails_secs: 60,
        }
    }
}

impl WorkersConfig {
    /// Configured interval of the worker draining `key`, in seconds
    pub fn secs_for(&self, key: BufferKey) -> u64 {
        match key {
            BufferKey::WorksCreate => self.works_create_secs,
            BufferKey::WorksUpdate => self.works_update_secs,
            BufferKey::ChaptersCreate => self.chapters_create_secs,
            BufferKey::ChaptersUpdate => self.chapters_update_secs,
            BufferKey::CommentsCreate => self.comments_create_secs,
            BufferKey::CommentsUpdate => self.comments_update_secs,
            BufferKey::TagsCreate => self.tags_create_secs,
            BufferKey::TagsUpdate => self.tags_update_secs,
            BufferKey::UserTagsCreate | BufferKey::UserTagsDelete => self.user_tags_secs,
            BufferKey::WorkLikesCreate | BufferKey::WorkLikesDelete => self.work_likes_secs,
            BufferKey::WorkTagsCreate | BufferKey::WorkTagsDelete => self.work_tags_secs,
            BufferKey::EmailsToSend => self.emails_secs,
        }
    }
}

/// Sender identity stamped on every outbox email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sender_name: String,
    pub sender_email: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender_name: "Quire".to_string(),
            sender_email: "noreply@quire.local".to_string(),
        }
    }
}

/// Public site settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL for links in emails and chat buttons
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8087".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[buffer]"));
        assert!(toml.contains("[workers]"));
        assert!(toml.contains("mode = \"list\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [buffer]
            mode = "scalar"

            [workers]
            work_likes_secs = 5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.buffer.mode, BufferMode::Scalar);
        assert_eq!(config.interval_for(BufferKey::WorkLikesDelete), Duration::from_secs(5));
        assert_eq!(config.buffer.ttl_secs, 65); // default preserved
    }

    #[test]
    fn interval_at_or_above_ttl_is_rejected() {
        let mut config = Config::default();
        config.workers.tags_update_secs = 120;

        match config.validate().unwrap_err() {
            QuireError::TimingInvariant { worker, interval_secs, .. } => {
                assert_eq!(worker, "tags.update");
                assert_eq!(interval_secs, 120);
            }
            other => panic!("unexpected error: {}", other),
        }

        config.workers.tags_update_secs = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = Config::default();
        config.workers.emails_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(QuireError::ZeroInterval(worker)) if worker == "emails.send"
        ));
    }
}
