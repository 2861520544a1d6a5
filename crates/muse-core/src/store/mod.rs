//! Note stores.
//!
//! [`NoteStore`] is the single interface the views and the application shell
//! talk to. [`LocalNoteStore`] keeps everything in memory; [`RemoteNoteStore`]
//! persists through a [`NotesBackend`] and refetches after every acknowledged
//! mutation. Which one is used is decided when the app is assembled.

mod backend;
mod fixtures;
mod local;
mod remote;

use crate::models::{Note, NoteId, NotePatch, NoteTag};

pub use backend::{NotesBackend, SupabaseNotesBackend};
pub use fixtures::fixture_notes;
pub use local::LocalNoteStore;
pub use remote::RemoteNoteStore;

/// Cached notes plus the view state shared by both store variants.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    notes: Vec<Note>,
    active_id: Option<NoteId>,
    selected_tag: Option<NoteTag>,
}

impl NoteCollection {
    /// All notes in store order
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &NoteId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub const fn active_id(&self) -> Option<&NoteId> {
        self.active_id.as_ref()
    }

    #[must_use]
    pub fn active_note(&self) -> Option<&Note> {
        self.active_id.as_ref().and_then(|id| self.get(id))
    }

    #[must_use]
    pub const fn selected_tag(&self) -> Option<NoteTag> {
        self.selected_tag
    }

    /// Notes in store order, restricted to those carrying `filter` if given.
    #[must_use]
    pub fn list(&self, filter: Option<NoteTag>) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|note| filter.map_or(true, |tag| note.has_tag(tag)))
            .collect()
    }

    /// Select a note. Unknown ids are ignored so the selection never dangles.
    pub fn select(&mut self, id: &NoteId) -> bool {
        if self.contains(id) {
            self.active_id = Some(id.clone());
            true
        } else {
            tracing::debug!("Ignoring selection of unknown note {}", id);
            false
        }
    }

    pub fn set_filter(&mut self, tag: Option<NoteTag>) {
        self.selected_tag = tag;
    }

    /// Replace the cache with a fresh fetch and reconcile the selection.
    pub(crate) fn replace(&mut self, notes: Vec<Note>) {
        self.notes = notes;
        let still_present = self
            .active_id
            .as_ref()
            .is_some_and(|id| self.contains(id));
        if !still_present {
            self.active_id = self.notes.first().map(|note| note.id.clone());
        }
    }

    pub(crate) fn insert_front(&mut self, note: Note) {
        self.notes.retain(|existing| existing.id != note.id);
        self.notes.insert(0, note);
    }

    pub(crate) fn get_mut(&mut self, id: &NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| &note.id == id)
    }

    /// Remove a note; if it was active, the first remaining note (or nothing)
    /// becomes active.
    pub(crate) fn remove(&mut self, id: &NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|note| &note.id == id)?;
        let removed = self.notes.remove(index);
        if self.active_id.as_ref() == Some(id) {
            self.active_id = self.notes.first().map(|note| note.id.clone());
        }
        Some(removed)
    }
}

/// The store contract shared by the local and remote variants.
///
/// Mutations never return errors: remote failures are reported through the
/// store's notifier and surface here as `false`/`None`.
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    fn collection(&self) -> &NoteCollection;

    fn select_active(&mut self, id: &NoteId) -> bool;

    fn filter_by_tag(&mut self, tag: Option<NoteTag>);

    /// Invalidate and refetch the cache (no-op for purely local stores).
    async fn refresh(&mut self);

    /// Create an empty note and make it active.
    async fn create(&mut self) -> Option<Note>;

    async fn update(&mut self, id: &NoteId, patch: NotePatch) -> bool;

    async fn delete(&mut self, id: &NoteId) -> bool;

    /// Toggle one tag on a note; equivalent to `update` with the new tag set.
    async fn toggle_tag(&mut self, id: &NoteId, tag: NoteTag) -> bool {
        let Some(note) = self.get(id) else {
            tracing::debug!("Cannot toggle tag on unknown note {}", id);
            return false;
        };
        let tags = note.toggled_tags(tag);
        self.update(id, NotePatch::tags(tags)).await
    }

    fn notes(&self) -> &[Note] {
        self.collection().notes()
    }

    fn list(&self, filter: Option<NoteTag>) -> Vec<&Note> {
        self.collection().list(filter)
    }

    /// Notes matching the currently selected tag filter
    fn filtered_notes(&self) -> Vec<&Note> {
        self.collection().list(self.collection().selected_tag())
    }

    fn get(&self, id: &NoteId) -> Option<&Note> {
        self.collection().get(id)
    }

    fn active_note_id(&self) -> Option<&NoteId> {
        self.collection().active_id()
    }

    fn active_note(&self) -> Option<&Note> {
        self.collection().active_note()
    }

    fn selected_tag(&self) -> Option<NoteTag> {
        self.collection().selected_tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, tags: &[NoteTag]) -> Note {
        let mut note = Note::new_empty();
        note.id = NoteId::from(id);
        note.tags = tags.iter().copied().collect();
        note
    }

    fn collection() -> NoteCollection {
        let mut collection = NoteCollection::default();
        collection.replace(vec![
            note("a", &[NoteTag::Work]),
            note("b", &[NoteTag::Personal]),
            note("c", &[NoteTag::Work, NoteTag::Todo]),
        ]);
        collection
    }

    #[test]
    fn replace_selects_first_note_when_nothing_active() {
        let collection = collection();
        assert_eq!(collection.active_id(), Some(&NoteId::from("a")));
    }

    #[test]
    fn replace_keeps_existing_selection() {
        let mut collection = collection();
        assert!(collection.select(&NoteId::from("c")));
        collection.replace(vec![note("b", &[]), note("c", &[])]);
        assert_eq!(collection.active_id(), Some(&NoteId::from("c")));
    }

    #[test]
    fn replace_reassigns_vanished_selection() {
        let mut collection = collection();
        collection.select(&NoteId::from("c"));
        collection.replace(vec![note("b", &[])]);
        assert_eq!(collection.active_id(), Some(&NoteId::from("b")));
        collection.replace(Vec::new());
        assert_eq!(collection.active_id(), None);
    }

    #[test]
    fn select_ignores_unknown_ids() {
        let mut collection = collection();
        assert!(!collection.select(&NoteId::from("zzz")));
        assert_eq!(collection.active_id(), Some(&NoteId::from("a")));
    }

    #[test]
    fn list_filters_by_tag() {
        let collection = collection();
        let work: Vec<_> = collection
            .list(Some(NoteTag::Work))
            .into_iter()
            .map(|note| note.id.as_str())
            .collect();
        assert_eq!(work, vec!["a", "c"]);
        assert_eq!(collection.list(None).len(), 3);
        assert!(collection.list(Some(NoteTag::Ideas)).is_empty());
    }

    #[test]
    fn remove_active_moves_to_first_remaining() {
        let mut collection = collection();
        collection.remove(&NoteId::from("a"));
        assert_eq!(collection.active_id(), Some(&NoteId::from("b")));

        collection.select(&NoteId::from("c"));
        collection.remove(&NoteId::from("b"));
        assert_eq!(collection.active_id(), Some(&NoteId::from("c")));

        collection.remove(&NoteId::from("c"));
        assert_eq!(collection.active_id(), None);
    }
}
