//! Tag vocabulary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The closed set of tags a note can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteTag {
    Work,
    Personal,
    Ideas,
    Todo,
}

impl NoteTag {
    /// Every tag, in display order
    pub const ALL: [Self; 4] = [Self::Work, Self::Personal, Self::Ideas, Self::Todo];

    /// Wire/storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Ideas => "ideas",
            Self::Todo => "todo",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Ideas => "Ideas",
            Self::Todo => "To-Do",
        }
    }
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == normalized)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Unknown tag '{}' (expected one of: work, personal, ideas, todo)",
                    s.trim()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("WORK".parse::<NoteTag>().unwrap(), NoteTag::Work);
        assert_eq!(" todo ".parse::<NoteTag>().unwrap(), NoteTag::Todo);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("urgent".parse::<NoteTag>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(NoteTag::Todo.label(), "To-Do");
        assert_eq!(NoteTag::Ideas.to_string(), "ideas");
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&NoteTag::Personal).unwrap();
        assert_eq!(json, "\"personal\"");
    }
}
