use muse_core::app::NotesApp;
use muse_core::notify::NotificationQueue;
use muse_core::store::NoteStore;

use crate::commands::common::{failure_from, print_successes};
use crate::error::CliError;

pub async fn run_new<S: NoteStore>(
    app: &mut NotesApp<S>,
    notifications: &NotificationQueue,
) -> Result<(), CliError> {
    let created = app.create().await;
    let raised = print_successes(notifications);
    let note = created.ok_or_else(|| failure_from(&raised, "Failed to create note"))?;
    println!("{}", note.id);
    Ok(())
}
