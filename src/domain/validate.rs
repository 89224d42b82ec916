//! Rule collection for entity validation
//!
//! Every violated rule is collected so a single error reports all of them,
//! joined with ` || `.

use crate::error::{QuireError, QuireResult};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub(crate) struct Rules {
    entity: &'static str,
    violations: Vec<String>,
}

impl Rules {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self {
            entity,
            violations: Vec::new(),
        }
    }

    /// Identifier must not be the nil UUID
    pub(crate) fn id(mut self, field: &str, id: Uuid) -> Self {
        if id.is_nil() {
            self.violations.push(format!("{} cannot be empty", field));
        }
        self
    }

    /// Text must be non-blank and within `min..=max` characters
    pub(crate) fn text(mut self, field: &str, value: &str, min: usize, max: usize) -> Self {
        let len = value.chars().count();
        if value.trim().is_empty() {
            self.violations.push(format!("{} cannot be empty", field));
        } else if len < min {
            self.violations.push(format!("{} is too short", field));
        } else if len > max {
            self.violations.push(format!("{} is too long", field));
        }
        self
    }

    /// Enum value must not be its unset placeholder
    pub(crate) fn chosen(mut self, field: &str, is_set: bool) -> Self {
        if !is_set {
            self.violations
                .push(format!("{} is not a valid option", field));
        }
        self
    }

    pub(crate) fn not_future(mut self, field: &str, at: DateTime<Utc>) -> Self {
        if at > Utc::now() {
            self.violations
                .push(format!("{} cannot be in the future", field));
        }
        self
    }

    pub(crate) fn finish(self) -> QuireResult<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(QuireError::validation(
                self.entity,
                self.violations.join(" || "),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation() {
        let err = Rules::new("work")
            .id("user_id", Uuid::nil())
            .text("title", "", 1, 30)
            .text("description", &"x".repeat(501), 1, 500)
            .finish()
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("user_id cannot be empty"));
        assert!(message.contains("title cannot be empty"));
        assert!(message.contains("description is too long"));
        assert_eq!(message.matches(" || ").count(), 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 30 Cyrillic characters are 60 bytes
        let title = "я".repeat(30);
        assert!(Rules::new("work").text("title", &title, 1, 30).finish().is_ok());
    }
}
