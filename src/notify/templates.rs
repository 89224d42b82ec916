//! Subjects, HTML bodies, and chat texts for user notifications

use super::ChatLink;
use crate::domain::{Tag, User, Work};
use chrono::{Datelike, Utc};

const SITE_NAME: &str = "Quire";

/// A rendered notification, ready for either channel
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub subject: String,
    pub html: String,
    pub chat_text: String,
    pub link: Option<ChatLink>,
}

/// Renders notifications with links into the public site
#[derive(Debug, Clone)]
pub struct Templates {
    base_url: String,
}

impl Templates {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn work_url(&self, work: &Work) -> String {
        format!("{}/works/{}", self.base_url, work.id)
    }

    pub fn tag_url(&self, tag: &Tag) -> String {
        format!("{}/tags/{}", self.base_url, tag.id)
    }

    pub fn work_created(&self, user: &User, work: &Work) -> Message {
        let link = ChatLink {
            text: work.title.clone(),
            url: self.work_url(work),
        };
        Message {
            subject: format!("You created work [{}]", work.title),
            html: self.page(
                &format!("New work created: {}!", work.title),
                &format!(
                    "Hello, {}!<br>Your work <b>{}</b> has been created on {}.<br>",
                    user.nickname, work.title, SITE_NAME
                ),
                Some(&link),
            ),
            chat_text: format!("You created work {}", work.title),
            link: Some(link),
        }
    }

    pub fn work_liked(&self, user: &User, work: &Work) -> Message {
        self.like(user, work, "liked", "Like left")
    }

    pub fn work_unliked(&self, user: &User, work: &Work) -> Message {
        self.like(user, work, "removed like on", "Like removed")
    }

    pub fn tag_followed(&self, user: &User, tag: &Tag) -> Message {
        self.follow(user, tag, "followed", "Tag followed")
    }

    pub fn tag_unfollowed(&self, user: &User, tag: &Tag) -> Message {
        self.follow(user, tag, "unfollowed", "Tag unfollowed")
    }

    fn like(&self, user: &User, work: &Work, action: &str, heading: &str) -> Message {
        let link = ChatLink {
            text: work.title.clone(),
            url: self.work_url(work),
        };
        Message {
            subject: format!("You {} work [{}]", action, work.title),
            html: self.page(
                &format!("{}: {}!", heading, work.title),
                &format!(
                    "Hello, {}!<br>You {} <b>{}</b> on {}.",
                    user.nickname, action, work.title, SITE_NAME
                ),
                Some(&link),
            ),
            chat_text: format!("You {} {}", action, work.title),
            link: Some(link),
        }
    }

    fn follow(&self, user: &User, tag: &Tag, action: &str, heading: &str) -> Message {
        let link = ChatLink {
            text: tag.name.clone(),
            url: self.tag_url(tag),
        };
        Message {
            subject: format!("You {} tag [{}]", action, tag.name),
            html: self.page(
                &format!("{}: {}!", heading, tag.name),
                &format!(
                    "Hello, {}!<br>You {} tag <b>{}</b> on {}.<br>",
                    user.nickname, action, tag.name, SITE_NAME
                ),
                Some(&link),
            ),
            chat_text: format!("You {} tag {}", action, tag.name),
            link: Some(link),
        }
    }

    fn page(&self, title: &str, body: &str, button: Option<&ChatLink>) -> String {
        let button = button
            .map(|link| {
                format!(
                    "<div style='text-align: center; margin-top: 30px;'>\
                     <a href='{}' style='display: inline-block; padding: 10px 20px; \
                     background-color: #4a90e2; color: #fff; text-decoration: none; \
                     border-radius: 5px; font-weight: bold;'>{}</a></div>",
                    link.url, link.text
                )
            })
            .unwrap_or_default();

        format!(
            "<div style='font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; \
             padding: 20px; border: 1px solid #ddd; border-radius: 10px;'>\
             <h1 style='color: #4a90e2; text-align: center;'>{}</h1>\
             <p style='font-size: 16px; color: #333;'>{}</p>{}\
             <footer style='font-size: 12px; color: #aaa; margin-top: 40px; text-align: center;'>\
             {} &copy; {} All rights reserved.</footer></div>",
            title,
            body,
            button,
            SITE_NAME,
            Utc::now().year()
        )
    }
}
