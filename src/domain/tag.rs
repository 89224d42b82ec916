//! Tags that classify works and that users can follow

use super::primitives::AgeRestriction;
use super::validate::Rules;
use super::{Patch, Record};
use crate::error::QuireResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub age_restriction: AgeRestriction,
}

impl Tag {
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        age_restriction: AgeRestriction,
        description: impl Into<String>,
    ) -> QuireResult<Self> {
        let tag = Self {
            id,
            name: name.into(),
            description: description.into(),
            age_restriction,
        };
        tag.validate()?;
        Ok(tag)
    }

    pub fn update(
        &mut self,
        name: String,
        age_restriction: AgeRestriction,
        description: String,
    ) -> QuireResult<()> {
        let candidate = Self {
            id: self.id,
            name,
            description,
            age_restriction,
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    fn validate(&self) -> QuireResult<()> {
        Rules::new(Self::KIND)
            .id("id", self.id)
            .text("name", &self.name, 2, 30)
            .text("description", &self.description, 2, 500)
            .chosen("age_restriction", self.age_restriction.is_set())
            .finish()
    }
}

impl Record for Tag {
    type Key = Uuid;
    const KIND: &'static str = "tag";

    fn key(&self) -> Uuid {
        self.id
    }
}

/// Sparse update of a tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagPatch {
    pub id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_restriction: Option<AgeRestriction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Patch<Tag> for TagPatch {
    fn target(&self) -> Uuid {
        self.id
    }

    fn apply_to(&self, tag: &mut Tag) -> QuireResult<()> {
        tag.update(
            self.name.clone().unwrap_or_else(|| tag.name.clone()),
            self.age_restriction.unwrap_or(tag.age_restriction),
            self.description
                .clone()
                .unwrap_or_else(|| tag.description.clone()),
        )
    }
}
