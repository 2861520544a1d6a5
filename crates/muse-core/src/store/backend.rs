//! Remote notes table (Supabase PostgREST).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::auth::AuthSession;
use crate::config::SupabaseConfig;
use crate::error::{Error, Result};
use crate::models::{Note, NoteId, NotePatch, NoteTag};
use crate::util::parse_api_error;

const NOTES_TABLE: &str = "notes";

/// Row-level operations on the notes table, scoped by owning user.
#[allow(async_fn_in_trait)]
pub trait NotesBackend {
    /// All notes owned by `user_id`, newest first.
    async fn select_by_user(&self, user_id: &str) -> Result<Vec<Note>>;

    /// Insert an empty note for `user_id` and return the stored row.
    async fn insert(&self, user_id: &str) -> Result<Note>;

    async fn update_by_id(
        &self,
        id: &NoteId,
        patch: &NotePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn delete_by_id(&self, id: &NoteId) -> Result<()>;
}

/// PostgREST client authenticated as the signed-in user.
#[derive(Clone)]
pub struct SupabaseNotesBackend {
    table_url: String,
    anon_key: String,
    access_token: String,
    client: Client,
}

impl SupabaseNotesBackend {
    pub fn new(config: &SupabaseConfig, session: &AuthSession) -> Result<Self> {
        Ok(Self {
            table_url: format!("{}/{NOTES_TABLE}", config.rest_url()),
            anon_key: config.anon_key.clone(),
            access_token: session.access_token.clone(),
            client: Client::builder().build()?,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api(parse_api_error(status, &body)))
    }
}

impl NotesBackend for SupabaseNotesBackend {
    async fn select_by_user(&self, user_id: &str) -> Result<Vec<Note>> {
        let request = self.authorized(self.client.get(&self.table_url).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("order", "created_at.desc".to_string()),
        ]));
        let response = Self::ensure_success(request.send().await?).await?;
        let rows = response.json::<Vec<NoteRow>>().await?;
        tracing::debug!("Fetched {} notes for user {}", rows.len(), user_id);
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn insert(&self, user_id: &str) -> Result<Note> {
        let payload = NewNoteRow {
            user_id,
            title: "",
            content: "",
            tags: Vec::new(),
        };
        let request = self.authorized(
            self.client
                .post(&self.table_url)
                .header("Prefer", "return=representation")
                .json(&payload),
        );
        let response = Self::ensure_success(request.send().await?).await?;
        let mut rows = response.json::<Vec<NoteRow>>().await?;
        if rows.is_empty() {
            return Err(Error::Api(
                "Insert response did not include the created note".to_string(),
            ));
        }
        Ok(rows.swap_remove(0).into())
    }

    async fn update_by_id(
        &self,
        id: &NoteId,
        patch: &NotePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let payload = NoteUpdateRow {
            patch,
            updated_at,
        };
        let request = self.authorized(
            self.client
                .patch(&self.table_url)
                .query(&[("id", format!("eq.{id}"))])
                .json(&payload),
        );
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &NoteId) -> Result<()> {
        let request = self.authorized(
            self.client
                .delete(&self.table_url)
                .query(&[("id", format!("eq.{id}"))]),
        );
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct NoteRow {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    summary: Option<String>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        let tags = row
            .tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| match raw.parse::<NoteTag>() {
                Ok(tag) => Some(tag),
                Err(_) => {
                    tracing::warn!("Dropping unknown tag '{}' on note {}", raw, row.id);
                    None
                }
            })
            .collect::<BTreeSet<_>>();

        Self {
            id: NoteId::from(row.id),
            title: row.title.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at.max(row.created_at),
            summary: row.summary,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewNoteRow<'a> {
    user_id: &'a str,
    title: &'a str,
    content: &'a str,
    tags: Vec<NoteTag>,
}

#[derive(Debug, Serialize)]
struct NoteUpdateRow<'a> {
    #[serde(flatten)]
    patch: &'a NotePatch,
    updated_at: DateTime<Utc>,
}
