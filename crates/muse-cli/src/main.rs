//! Muse CLI - markdown notes with tags from the terminal
//!
//! Notes live in Supabase by default; `--offline` works against the seeded
//! in-memory store instead.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use clap::Parser;
use muse_core::app::NotesApp;
use muse_core::notify::NotificationQueue;
use muse_core::store::{LocalNoteStore, RemoteNoteStore, SupabaseNotesBackend};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::ProfileContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::{run_note_command, NoteCommand};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "muse=info";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    let note_command = match cli.command {
        Commands::List { tag, search, json } => NoteCommand::List { tag, search, json },
        Commands::Show { id, preview, json } => NoteCommand::Show { id, preview, json },
        Commands::New => NoteCommand::New,
        Commands::Edit { id, title, content } => NoteCommand::Edit { id, title, content },
        Commands::Tag { id, tag } => NoteCommand::Tag { id, tag },
        Commands::Delete { id } => NoteCommand::Delete { id },
        Commands::Auth { command } => return run_auth(command, profile).await,
        Commands::Config { command } => return run_config(command, profile),
        Commands::Completions { shell, output } => {
            return run_completions(shell, output.as_deref());
        }
    };

    let notifications = NotificationQueue::default();
    if cli.offline {
        let mut app = NotesApp::new(LocalNoteStore::seeded());
        app.start().await;
        return run_note_command(&mut app, note_command, &notifications).await;
    }

    let context = ProfileContext::resolve(profile)?;
    let supabase = context.require_supabase()?;
    let session = context
        .auth_client()?
        .restore_session()
        .await?
        .ok_or(CliError::NotSignedIn)?;

    let backend = SupabaseNotesBackend::new(supabase, &session)?;
    let store = RemoteNoteStore::new(backend, Some(session.user.id.clone()), notifications.clone());
    let mut app = NotesApp::new(store);
    app.start().await;
    run_note_command(&mut app, note_command, &notifications).await
}
