//! Note model

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tag::NoteTag;

/// Opaque note identifier.
///
/// Locally created notes get a UUID v7 token; notes coming from the remote
/// table keep whatever primary key the table assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new random local identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for NoteId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Note ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Free text title, may be empty
    pub title: String,
    /// Markdown content, may be empty
    pub content: String,
    /// Tags drawn from the fixed vocabulary
    pub tags: BTreeSet<NoteTag>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Reserved for a generated summary; nothing populates it yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Note {
    /// Create a new empty note with a fresh local ID
    #[must_use]
    pub fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::generate(),
            title: String::new(),
            content: String::new(),
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            summary: None,
        }
    }

    /// Check whether the note carries the given tag
    #[must_use]
    pub fn has_tag(&self, tag: NoteTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Tag set with `tag` toggled (symmetric difference with `{tag}`)
    #[must_use]
    pub fn toggled_tags(&self, tag: NoteTag) -> BTreeSet<NoteTag> {
        let mut tags = self.tags.clone();
        if !tags.remove(&tag) {
            tags.insert(tag);
        }
        tags
    }

    /// Case-insensitive match of `query` against title and content.
    ///
    /// An empty (or whitespace-only) query matches every note.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query) || self.content.to_lowercase().contains(&query)
    }

    /// Merge a patch into this note and refresh `updated_at`.
    pub fn apply(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Partial update of a note's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<NoteTag>>,
}

impl NotePatch {
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn tags(tags: BTreeSet<NoteTag>) -> Self {
        Self {
            title: None,
            content: None,
            tags: Some(tags),
        }
    }

    /// True when the patch would not change any field
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::generate();
        let id2 = NoteId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_note_id_parse_rejects_blank() {
        assert!("   ".parse::<NoteId>().is_err());
        let parsed: NoteId = " abc ".parse().unwrap();
        assert_eq!(parsed.as_str(), "abc");
    }

    #[test]
    fn test_new_empty_note() {
        let note = Note::new_empty();
        assert!(note.title.is_empty());
        assert!(note.content.is_empty());
        assert!(note.tags.is_empty());
        assert!(note.summary.is_none());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_toggle_tag_twice_restores_set() {
        let mut note = Note::new_empty();
        note.tags.insert(NoteTag::Work);
        let original = note.tags.clone();

        note.tags = note.toggled_tags(NoteTag::Todo);
        assert!(note.has_tag(NoteTag::Todo));
        note.tags = note.toggled_tags(NoteTag::Todo);
        assert_eq!(note.tags, original);

        note.tags = note.toggled_tags(NoteTag::Work);
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_matches_query_is_case_insensitive() {
        let mut note = Note::new_empty();
        note.title = "Shopping".to_string();
        note.content = "Milk and EGGS".to_string();

        assert!(note.matches_query("shop"));
        assert!(note.matches_query("eggs"));
        assert!(note.matches_query(""));
        assert!(!note.matches_query("bread"));
    }

    #[test]
    fn test_apply_patch_merges_fields() {
        let mut note = Note::new_empty();
        let later = note.created_at + Duration::seconds(5);

        note.apply(NotePatch::title("Plan"), later);
        assert_eq!(note.title, "Plan");
        assert!(note.content.is_empty());
        assert_eq!(note.updated_at, later);
    }

    #[test]
    fn test_apply_never_moves_updated_before_created() {
        let mut note = Note::new_empty();
        let earlier = note.created_at - Duration::seconds(60);

        note.apply(NotePatch::content("x"), earlier);
        assert!(note.updated_at >= note.created_at);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = NotePatch::content("body");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "content": "body" }));
        assert!(NotePatch::default().is_empty());
    }
}
