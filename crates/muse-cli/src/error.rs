use std::io;

use muse_core::auth::AuthError;
use muse_core::verification::MarkerError;
use thiserror::Error;

use crate::config_profiles::ProfileConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] muse_core::Error),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Marker(#[from] MarkerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Nothing to change: pass --title and/or --content")]
    NothingToEdit,
    #[error("{0}")]
    OperationFailed(String),
    #[error("Configuration error: {0}")]
    Profiles(#[from] ProfileConfigError),
    #[error(
        "Supabase is not configured. Run `muse config init` or set SUPABASE_URL and \
         SUPABASE_ANON_KEY (or pass --offline)."
    )]
    NotConfigured,
    #[error("Not signed in. Run `muse auth login` first (or pass --offline).")]
    NotSignedIn,
    #[error("Email verification failed: {0}")]
    Verification(String),
}
