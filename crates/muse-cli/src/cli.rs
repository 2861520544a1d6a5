use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use muse_core::NoteTag;

#[derive(Parser)]
#[command(name = "muse")]
#[command(about = "Markdown notes with tags, from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name holding the Supabase project settings
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Use the seeded in-memory store instead of Supabase
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List notes, newest first
    List {
        /// Only notes carrying this tag (work, personal, ideas, todo)
        #[arg(long)]
        tag: Option<NoteTag>,
        /// Case-insensitive text to look for in title and content
        #[arg(long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one note
    Show {
        /// Note ID or a unique ID prefix
        id: String,
        /// Print the markdown body under a preview header
        #[arg(long)]
        preview: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an empty note and print its ID
    New,
    /// Change a note's title and/or content
    Edit {
        /// Note ID or a unique ID prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Toggle a tag on a note
    Tag {
        /// Note ID or a unique ID prefix
        id: String,
        /// Tag to toggle (work, personal, ideas, todo)
        tag: NoteTag,
    },
    /// Delete a note
    Delete {
        /// Note ID or a unique ID prefix
        id: String,
    },
    /// Sign up, sign in and email verification
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// URL verification emails redirect back to (ends in /auth/callback)
        #[arg(long, value_name = "URL")]
        redirect_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account; a confirmation email may be sent
    Signup {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        #[arg(long, value_name = "PASSWORD")]
        confirm_password: String,
    },
    /// Sign in with email/password and store the session in the keychain
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user and any pending verification
    Status,
    /// Complete email verification from the redirect URL
    Callback {
        /// Full URL the verification link redirected to
        url: String,
    },
    /// Wait until the pending email address is verified
    WaitVerification {
        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}
