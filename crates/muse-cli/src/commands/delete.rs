use muse_core::app::NotesApp;
use muse_core::notify::NotificationQueue;
use muse_core::store::NoteStore;

use crate::commands::common::{failure_from, print_successes, resolve_note_id};
use crate::error::CliError;

pub async fn run_delete<S: NoteStore>(
    app: &mut NotesApp<S>,
    notifications: &NotificationQueue,
    id: &str,
) -> Result<(), CliError> {
    let note_id = resolve_note_id(app.store(), id)?;
    let deleted = app.delete(&note_id).await;
    let raised = print_successes(notifications);
    if !deleted {
        return Err(failure_from(&raised, "Failed to delete note"));
    }
    println!("{note_id}");
    Ok(())
}
