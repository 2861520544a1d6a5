use muse_core::app::NotesApp;
use muse_core::notify::NotificationQueue;
use muse_core::store::NoteStore;
use muse_core::NoteTag;

use crate::commands::common::{failure_from, print_successes, resolve_note_id};
use crate::error::CliError;

pub async fn run_tag<S: NoteStore>(
    app: &mut NotesApp<S>,
    notifications: &NotificationQueue,
    id: &str,
    tag: NoteTag,
) -> Result<(), CliError> {
    let note_id = resolve_note_id(app.store(), id)?;
    if !app.select(&note_id) {
        return Err(CliError::NoteNotFound(note_id.to_string()));
    }

    let toggled = app.toggle_tag(tag).await;
    let raised = print_successes(notifications);
    if !toggled {
        return Err(failure_from(&raised, "Failed to update tags"));
    }

    let tags = app
        .store()
        .get(&note_id)
        .map(|note| {
            note.tags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    println!("{note_id}  [{tags}]");
    Ok(())
}
