use chrono::{DateTime, Utc};
use muse_core::config::SupabaseConfig;
use muse_core::notify::{Notification, NotificationQueue};
use muse_core::store::NoteStore;
use muse_core::views::NoteListItem;
use muse_core::NoteId;

use crate::auth::{auth_client, CliAuthClient};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

const SHORT_ID_CHARS: usize = 13;
const TITLE_COLUMN: usize = 40;
const AMBIGUOUS_PREVIEW: usize = 3;

/// Profile name plus its resolved Supabase settings.
pub struct ProfileContext {
    pub name: String,
    pub supabase: Option<SupabaseConfig>,
}

impl ProfileContext {
    pub fn resolve(explicit_profile: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load()?;
        let name = config.resolve_profile_name(explicit_profile);
        let supabase = config
            .profile(&name)
            .cloned()
            .unwrap_or_default()
            .supabase_config()?;
        Ok(Self { name, supabase })
    }

    pub fn require_supabase(&self) -> Result<&SupabaseConfig, CliError> {
        self.supabase.as_ref().ok_or(CliError::NotConfigured)
    }

    pub fn auth_client(&self) -> Result<CliAuthClient, CliError> {
        Ok(auth_client(&self.name, self.require_supabase()?)?)
    }
}

pub fn parse_note_id(raw: &str) -> Result<NoteId, CliError> {
    raw.parse::<NoteId>().map_err(|_| CliError::EmptyNoteId)
}

/// Resolve a full id or a unique id prefix, such as the short ids `list`
/// prints.
pub fn resolve_note_id<S: NoteStore>(store: &S, raw: &str) -> Result<NoteId, CliError> {
    let query = parse_note_id(raw)?;
    if store.get(&query).is_some() {
        return Ok(query);
    }

    let matches: Vec<&NoteId> = store
        .notes()
        .iter()
        .map(|note| &note.id)
        .filter(|id| id.as_str().starts_with(query.as_str()))
        .collect();
    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(query.to_string())),
        [only] => Ok((*only).clone()),
        _ => {
            let options = matches
                .iter()
                .take(AMBIGUOUS_PREVIEW)
                .copied()
                .map(short_id)
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &NoteId) -> String {
    id.as_str().chars().take(SHORT_ID_CHARS).collect()
}

fn truncate_column(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count <= width {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(width.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

/// One plain-text line per list item.
pub fn format_item_lines(items: &[NoteListItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let marker = if item.is_active { '*' } else { ' ' };
            let id = short_id(&item.id);
            let title = truncate_column(&item.title, TITLE_COLUMN);
            let line = format!("{marker} {id:<13}  {title:<40}  {:<11}", item.date);
            if item.tags.is_empty() {
                line.trim_end().to_string()
            } else {
                format!("{line}  [{}]", item.tags.join(", "))
            }
        })
        .collect()
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Turn the error notifications raised by a failed operation into a CLI error.
pub fn failure_from(notifications: &[Notification], fallback: &str) -> CliError {
    notifications
        .iter()
        .rev()
        .find(|notification| notification.is_error())
        .map_or_else(
            || CliError::OperationFailed(fallback.to_string()),
            |notification| {
                CliError::OperationFailed(format!(
                    "{}: {}",
                    notification.title, notification.description
                ))
            },
        )
}

/// Print queued success notifications; error notifications are reported by
/// the caller through [`failure_from`].
pub fn print_successes(notifications: &NotificationQueue) -> Vec<Notification> {
    let drained = notifications.drain();
    for notification in drained.iter().filter(|notification| !notification.is_error()) {
        println!("{}: {}", notification.title, notification.description);
    }
    drained
}
