//! Note store backed by the remote notes table.

use chrono::Utc;

use super::{NoteCollection, NoteStore, NotesBackend};
use crate::models::{Note, NoteId, NotePatch, NoteTag};
use crate::notify::{Notification, Notifier};

/// Remote-backed store.
///
/// Nothing is applied to the cache before the backend acknowledges it; each
/// acknowledged mutation is followed by a full refetch.
pub struct RemoteNoteStore<B: NotesBackend, N: Notifier> {
    backend: B,
    notifier: N,
    user_id: Option<String>,
    collection: NoteCollection,
}

impl<B: NotesBackend, N: Notifier> RemoteNoteStore<B, N> {
    pub fn new(backend: B, user_id: Option<String>, notifier: N) -> Self {
        Self {
            backend,
            notifier,
            user_id,
            collection: NoteCollection::default(),
        }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn report_error(&self, title: &str, error: &impl std::fmt::Display) {
        self.notifier
            .notify(Notification::error(title, error.to_string()));
    }
}

impl<B: NotesBackend, N: Notifier> NoteStore for RemoteNoteStore<B, N> {
    fn collection(&self) -> &NoteCollection {
        &self.collection
    }

    fn select_active(&mut self, id: &NoteId) -> bool {
        self.collection.select(id)
    }

    fn filter_by_tag(&mut self, tag: Option<NoteTag>) {
        self.collection.set_filter(tag);
    }

    async fn refresh(&mut self) {
        let Some(user_id) = self.user_id.as_deref() else {
            self.collection.replace(Vec::new());
            return;
        };

        match self.backend.select_by_user(user_id).await {
            Ok(notes) => {
                tracing::debug!("Notes cache refreshed ({} notes)", notes.len());
                self.collection.replace(notes);
            }
            Err(error) => self.report_error("Error loading notes", &error),
        }
    }

    async fn create(&mut self) -> Option<Note> {
        let Some(user_id) = self.user_id.clone() else {
            self.report_error("Error creating note", &crate::Error::NotAuthenticated);
            return None;
        };

        match self.backend.insert(&user_id).await {
            Ok(note) => {
                self.refresh().await;
                // The insert was acknowledged even if the refetch was not.
                if !self.collection.contains(&note.id) {
                    self.collection.insert_front(note.clone());
                }
                self.collection.select(&note.id);
                self.notifier.notify(Notification::success(
                    "Note created",
                    "New note created successfully.",
                ));
                Some(note)
            }
            Err(error) => {
                self.report_error("Error creating note", &error);
                None
            }
        }
    }

    async fn update(&mut self, id: &NoteId, patch: NotePatch) -> bool {
        if patch.is_empty() {
            return true;
        }

        match self.backend.update_by_id(id, &patch, Utc::now()).await {
            Ok(()) => {
                self.refresh().await;
                true
            }
            Err(error) => {
                self.report_error("Error updating note", &error);
                false
            }
        }
    }

    async fn delete(&mut self, id: &NoteId) -> bool {
        match self.backend.delete_by_id(id).await {
            Ok(()) => {
                self.collection.remove(id);
                self.refresh().await;
                self.notifier.notify(Notification::success(
                    "Note deleted",
                    "Note deleted successfully.",
                ));
                true
            }
            Err(error) => {
                self.report_error("Error deleting note", &error);
                false
            }
        }
    }
}
