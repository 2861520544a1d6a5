//! In-memory note store used when no backend is wired up.

use chrono::Utc;

use super::{fixture_notes, NoteCollection, NoteStore};
use crate::models::{Note, NoteId, NotePatch, NoteTag};

#[derive(Debug, Clone, Default)]
pub struct LocalNoteStore {
    collection: NoteCollection,
}

impl LocalNoteStore {
    /// Empty store with nothing selected
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the fixture notes, first fixture active.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_notes(fixture_notes())
    }

    #[must_use]
    pub fn with_notes(notes: Vec<Note>) -> Self {
        let mut collection = NoteCollection::default();
        collection.replace(notes);
        Self { collection }
    }
}

impl NoteStore for LocalNoteStore {
    fn collection(&self) -> &NoteCollection {
        &self.collection
    }

    fn select_active(&mut self, id: &NoteId) -> bool {
        self.collection.select(id)
    }

    fn filter_by_tag(&mut self, tag: Option<NoteTag>) {
        self.collection.set_filter(tag);
    }

    async fn refresh(&mut self) {}

    async fn create(&mut self) -> Option<Note> {
        let note = Note::new_empty();
        tracing::debug!("Created local note {}", note.id);
        self.collection.insert_front(note.clone());
        self.collection.select(&note.id);
        Some(note)
    }

    async fn update(&mut self, id: &NoteId, patch: NotePatch) -> bool {
        let Some(note) = self.collection.get_mut(id) else {
            tracing::debug!("Ignoring update for unknown note {}", id);
            return false;
        };
        note.apply(patch, Utc::now());
        true
    }

    async fn delete(&mut self, id: &NoteId) -> bool {
        self.collection.remove(id).is_some()
    }
}
