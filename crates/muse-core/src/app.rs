//! Application shell: one store, the editor and the list view wired together.

use chrono::{DateTime, Utc};

use crate::models::{Note, NoteId, NoteTag};
use crate::store::NoteStore;
use crate::views::list::{self, NoteListItem};
use crate::views::{NoteEditor, ScheduledSave};

/// Owns the store and the editor. Due saves become store writes only here.
pub struct NotesApp<S> {
    store: S,
    editor: NoteEditor,
    search: String,
}

impl<S: NoteStore> NotesApp<S> {
    pub fn new(store: S) -> Self {
        Self::with_editor(store, NoteEditor::new())
    }

    pub fn with_editor(store: S, editor: NoteEditor) -> Self {
        let mut app = Self {
            store,
            editor,
            search: String::new(),
        };
        app.sync_editor();
        app
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn editor(&self) -> &NoteEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut NoteEditor {
        &mut self.editor
    }

    /// Load notes and point the editor at the active one.
    pub async fn start(&mut self) {
        self.store.refresh().await;
        self.sync_editor();
    }

    fn sync_editor(&mut self) {
        self.editor.load(self.store.active_note());
    }

    pub fn select(&mut self, id: &NoteId) -> bool {
        let selected = self.store.select_active(id);
        self.sync_editor();
        selected
    }

    pub async fn create(&mut self) -> Option<Note> {
        let created = self.store.create().await;
        self.sync_editor();
        created
    }

    pub async fn delete(&mut self, id: &NoteId) -> bool {
        let deleted = self.store.delete(id).await;
        if deleted {
            self.editor.discard_saves_for(id);
        }
        self.sync_editor();
        deleted
    }

    /// Toggle a tag on the active note; written immediately, not debounced.
    pub async fn toggle_tag(&mut self, tag: NoteTag) -> bool {
        let Some(id) = self.store.active_note_id().cloned() else {
            return false;
        };
        let toggled = self.store.toggle_tag(&id, tag).await;
        self.sync_editor();
        toggled
    }

    pub fn edit_title(&mut self, title: impl Into<String>) -> bool {
        self.editor.set_title(title)
    }

    pub fn edit_content(&mut self, content: impl Into<String>) -> bool {
        self.editor.set_content(content)
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter_by_tag(&mut self, tag: Option<NoteTag>) {
        self.store.filter_by_tag(tag);
    }

    /// Notes after the tag filter and then the search query.
    pub fn visible_notes(&self) -> Vec<&Note> {
        list::search(self.store.filtered_notes(), &self.search)
    }

    pub fn visible_items(&self, now: DateTime<Utc>) -> Vec<NoteListItem> {
        list::render_items(&self.visible_notes(), self.store.active_note_id(), now)
    }

    pub fn footer(&self) -> String {
        list::footer_count(self.store.notes().len())
    }

    /// Wait for the next due save and write it.
    pub async fn process_next_save(&mut self) -> bool {
        let save = self.editor.next_save().await;
        self.apply_save(save).await
    }

    /// Write every pending save now. Returns false if any write failed.
    pub async fn flush_pending_save(&mut self) -> bool {
        let mut all_written = true;
        while let Some(save) = self.editor.flush() {
            all_written &= self.apply_save(save).await;
        }
        all_written
    }

    async fn apply_save(&mut self, save: ScheduledSave) -> bool {
        tracing::debug!("Saving note {}", save.note_id);
        let written = self.store.update(&save.note_id, save.patch).await;
        self.sync_editor();
        written
    }
}
