//! Enumerations shared by entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship category of a work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    None,
    Gen,
    FemaleFemale,
    FemaleMale,
    MaleMale,
    Multi,
    Other,
}

impl Category {
    /// `None` is the unset placeholder and never valid on a stored work
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Gen => "gen",
            Self::FemaleFemale => "f/f",
            Self::FemaleMale => "f/m",
            Self::MaleMale => "m/m",
            Self::Multi => "multi",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Audience rating attached to a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRestriction {
    #[default]
    None,
    GeneralAudience,
    Teens,
    Explicit,
    Nc17,
    Nc21,
}

impl AgeRestriction {
    /// `None` is the unset placeholder and never valid on a stored tag
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for AgeRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::GeneralAudience => "G",
            Self::Teens => "T",
            Self::Explicit => "E",
            Self::Nc17 => "NC-17",
            Self::Nc21 => "NC-21",
        };
        write!(f, "{}", name)
    }
}
