pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod new;
pub mod show;
pub mod tag;

use muse_core::app::NotesApp;
use muse_core::notify::NotificationQueue;
use muse_core::store::NoteStore;
use muse_core::NoteTag;

use self::delete::run_delete;
use self::edit::run_edit;
use self::list::run_list;
use self::new::run_new;
use self::show::run_show;
use self::tag::run_tag;
use crate::error::CliError;

/// Commands that operate on the note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteCommand {
    List {
        tag: Option<NoteTag>,
        search: Option<String>,
        json: bool,
    },
    Show {
        id: String,
        preview: bool,
        json: bool,
    },
    New,
    Edit {
        id: String,
        title: Option<String>,
        content: Option<String>,
    },
    Tag {
        id: String,
        tag: NoteTag,
    },
    Delete {
        id: String,
    },
}

pub async fn run_note_command<S: NoteStore>(
    app: &mut NotesApp<S>,
    command: NoteCommand,
    notifications: &NotificationQueue,
) -> Result<(), CliError> {
    match command {
        NoteCommand::List { tag, search, json } => run_list(app, tag, search.as_deref(), json),
        NoteCommand::Show { id, preview, json } => run_show(app, &id, preview, json),
        NoteCommand::New => run_new(app, notifications).await,
        NoteCommand::Edit { id, title, content } => {
            run_edit(app, notifications, &id, title, content).await
        }
        NoteCommand::Tag { id, tag } => run_tag(app, notifications, &id, tag).await,
        NoteCommand::Delete { id } => run_delete(app, notifications, &id).await,
    }
}
