//! Note list rendering: search, previews and relative dates.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::models::{Note, NoteId};

pub const UNTITLED: &str = "Untitled";
pub const EMPTY_PREVIEW: &str = "No content yet...";
pub const EMPTY_STATE: &str = "No notes found";
const PREVIEW_CHARS: usize = 80;

static MARKDOWN_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#*`_\[\]]").expect("Invalid regex"));

/// One rendered row of the note list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteListItem {
    pub id: NoteId,
    pub title: String,
    pub preview: String,
    pub date: String,
    pub tags: Vec<&'static str>,
    pub has_summary: bool,
    pub is_active: bool,
}

impl NoteListItem {
    #[must_use]
    pub fn from_note(note: &Note, active_id: Option<&NoteId>, now: DateTime<Utc>) -> Self {
        Self {
            id: note.id.clone(),
            title: display_title(note).to_string(),
            preview: preview(&note.content),
            date: relative_date(note.updated_at, now),
            tags: note.tags.iter().map(|tag| tag.label()).collect(),
            has_summary: note.summary.is_some(),
            is_active: active_id == Some(&note.id),
        }
    }
}

#[must_use]
pub fn display_title(note: &Note) -> &str {
    if note.title.is_empty() {
        UNTITLED
    } else {
        &note.title
    }
}

/// Content with markdown markers stripped, cut to the preview length.
#[must_use]
pub fn preview(content: &str) -> String {
    let stripped = MARKDOWN_MARKERS.replace_all(content, "");
    let preview: String = stripped.chars().take(PREVIEW_CHARS).collect();
    if preview.is_empty() {
        EMPTY_PREVIEW.to_string()
    } else {
        preview
    }
}

/// `Today`, `Yesterday`, `N days ago` within a week, otherwise `Jan 15`.
#[must_use]
pub fn relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - date).num_days().max(0);
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => date.format("%b %-d").to_string(),
    }
}

/// Notes whose title or content contains `query`, case-insensitively.
#[must_use]
pub fn search<'a>(notes: impl IntoIterator<Item = &'a Note>, query: &str) -> Vec<&'a Note> {
    notes
        .into_iter()
        .filter(|note| note.matches_query(query))
        .collect()
}

/// Build list rows for already-filtered notes.
#[must_use]
pub fn render_items(
    notes: &[&Note],
    active_id: Option<&NoteId>,
    now: DateTime<Utc>,
) -> Vec<NoteListItem> {
    notes
        .iter()
        .map(|note| NoteListItem::from_note(note, active_id, now))
        .collect()
}

/// Footer text counting every note, not only the visible ones.
#[must_use]
pub fn footer_count(total: usize) -> String {
    if total == 1 {
        "1 note".to_string()
    } else {
        format!("{total} notes")
    }
}
