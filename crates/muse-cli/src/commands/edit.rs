use muse_core::app::NotesApp;
use muse_core::notify::NotificationQueue;
use muse_core::store::NoteStore;

use crate::commands::common::{failure_from, print_successes, resolve_note_id};
use crate::error::CliError;

/// Apply the edit through the editor, then flush instead of waiting out the
/// debounce.
pub async fn run_edit<S: NoteStore>(
    app: &mut NotesApp<S>,
    notifications: &NotificationQueue,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<(), CliError> {
    if title.is_none() && content.is_none() {
        return Err(CliError::NothingToEdit);
    }
    let note_id = resolve_note_id(app.store(), id)?;
    if !app.select(&note_id) {
        return Err(CliError::NoteNotFound(note_id.to_string()));
    }

    if let Some(title) = title {
        app.edit_title(title);
    }
    if let Some(content) = content {
        app.edit_content(content);
    }

    let written = app.flush_pending_save().await;
    let raised = print_successes(notifications);
    if !written {
        return Err(failure_from(&raised, "Failed to update note"));
    }
    println!("{note_id}");
    Ok(())
}
