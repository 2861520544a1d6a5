use chrono::Utc;
use muse_core::app::NotesApp;
use muse_core::store::NoteStore;
use muse_core::views::list::{display_title, relative_date};
use muse_core::Note;

use crate::commands::common::{format_timestamp, resolve_note_id};
use crate::error::CliError;

pub fn run_show<S: NoteStore>(
    app: &NotesApp<S>,
    id: &str,
    preview: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let note_id = resolve_note_id(app.store(), id)?;
    let note = app
        .store()
        .get(&note_id)
        .ok_or_else(|| CliError::NoteNotFound(note_id.to_string()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        for line in render_note(note, preview) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn render_note(note: &Note, preview: bool) -> Vec<String> {
    let tags = note
        .tags
        .iter()
        .map(|tag| tag.label())
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![
        display_title(note).to_string(),
        format!("id:      {}", note.id),
        format!(
            "updated: {} ({})",
            format_timestamp(note.updated_at),
            relative_date(note.updated_at, Utc::now())
        ),
    ];
    if !tags.is_empty() {
        lines.push(format!("tags:    {tags}"));
    }
    lines.push(String::new());
    if preview {
        lines.push("--- Preview ---".to_string());
    }
    lines.push(note.content.clone());
    lines
}
