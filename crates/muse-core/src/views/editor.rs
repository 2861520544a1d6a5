//! Note editor state and the debounced save path.
//!
//! Keystrokes update the editor's local copy immediately and re-arm a
//! trailing-edge timer. When the timer fires the editor hands out a
//! [`ScheduledSave`] carrying the note id it was armed for; the application
//! shell turns it into a store update.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{Note, NoteId, NotePatch};

/// Quiet period after the last keystroke before a save is issued
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// A save that is due, bound to the note it was scheduled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSave {
    pub note_id: NoteId,
    pub patch: NotePatch,
}

struct PendingSave {
    note_id: NoteId,
    patch: NotePatch,
    generation: u64,
    timer: JoinHandle<()>,
}

impl PendingSave {
    fn into_save(self) -> ScheduledSave {
        self.timer.abort();
        ScheduledSave {
            note_id: self.note_id,
            patch: self.patch,
        }
    }
}

/// Trailing-edge debouncer for note saves.
///
/// Every `schedule` aborts the running timer and arms a new one tagged with
/// a fresh generation. A timer that fires for a generation that is no longer
/// pending is ignored.
pub struct SaveDebouncer {
    delay: Duration,
    generation: u64,
    pending: Option<PendingSave>,
    ready: VecDeque<ScheduledSave>,
    fired_tx: mpsc::UnboundedSender<u64>,
    fired_rx: mpsc::UnboundedReceiver<u64>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(SAVE_DEBOUNCE)
    }
}

impl SaveDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            delay,
            generation: 0,
            pending: None,
            ready: VecDeque::new(),
            fired_tx,
            fired_rx,
        }
    }

    /// Merge `patch` into the pending save for `note_id` and restart the timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, note_id: &NoteId, patch: NotePatch) {
        self.collect_fired();

        let mut merged = match self.pending.take() {
            Some(previous) if &previous.note_id == note_id => {
                previous.timer.abort();
                previous.patch
            }
            Some(previous) => {
                tracing::debug!("Dropping pending save for {} (note switched)", previous.note_id);
                previous.timer.abort();
                NotePatch::default()
            }
            None => NotePatch::default(),
        };
        merge_patch(&mut merged, patch);

        self.generation += 1;
        let generation = self.generation;
        let fired = self.fired_tx.clone();
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired.send(generation);
        });

        self.pending = Some(PendingSave {
            note_id: note_id.clone(),
            patch: merged,
            generation,
            timer,
        });
    }

    /// Drop the pending save without writing it. Saves that are already due
    /// stay queued.
    pub fn cancel(&mut self) {
        self.collect_fired();
        if let Some(pending) = self.pending.take() {
            tracing::debug!("Cancelled pending save for {}", pending.note_id);
            pending.timer.abort();
        }
    }

    /// Drop every save for `note_id`, due or pending. Used once the note is
    /// gone so nothing is written against a deleted id.
    pub fn discard(&mut self, note_id: &NoteId) {
        self.collect_fired();
        self.ready.retain(|save| &save.note_id != note_id);
        if let Some(pending) = self.pending.take_if(|pending| &pending.note_id == note_id) {
            pending.timer.abort();
        }
        tracing::debug!("Discarded saves for {}", note_id);
    }

    /// Take the pending save immediately, skipping the rest of the delay.
    pub fn flush(&mut self) -> Option<ScheduledSave> {
        self.collect_fired();
        if let Some(save) = self.ready.pop_front() {
            return Some(save);
        }
        self.pending.take().map(PendingSave::into_save)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some() || !self.ready.is_empty()
    }

    /// Wait for the next due save.
    ///
    /// Never resolves while nothing is pending. Cancel-safe, so it can sit in
    /// a `select!` next to other event sources.
    pub async fn next_due(&mut self) -> ScheduledSave {
        loop {
            if let Some(save) = self.ready.pop_front() {
                return save;
            }
            match self.fired_rx.recv().await {
                Some(generation) => self.promote(generation),
                None => std::future::pending::<()>().await,
            }
        }
    }

    // A save whose timer already fired must not absorb later edits.
    fn collect_fired(&mut self) {
        while let Ok(generation) = self.fired_rx.try_recv() {
            self.promote(generation);
        }
    }

    fn promote(&mut self, generation: u64) {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
        {
            if let Some(pending) = self.pending.take() {
                tracing::debug!("Save due for {}", pending.note_id);
                self.ready.push_back(pending.into_save());
            }
        } else {
            tracing::debug!("Ignoring superseded save timer {}", generation);
        }
    }
}

impl Drop for SaveDebouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.timer.abort();
        }
    }
}

fn merge_patch(into: &mut NotePatch, patch: NotePatch) {
    if patch.title.is_some() {
        into.title = patch.title;
    }
    if patch.content.is_some() {
        into.content = patch.content;
    }
    if patch.tags.is_some() {
        into.tags = patch.tags;
    }
}

/// Local editing state for the active note.
#[derive(Default)]
pub struct NoteEditor {
    note_id: Option<NoteId>,
    title: String,
    content: String,
    preview: bool,
    saves: SaveDebouncer,
}

impl NoteEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            saves: SaveDebouncer::new(delay),
            ..Self::default()
        }
    }

    /// Point the editor at `note`.
    ///
    /// Switching to a different id resets the local copy and preview mode and
    /// cancels the pending save. Reloading the same id keeps the local copy.
    pub fn load(&mut self, note: Option<&Note>) {
        let next_id = note.map(|note| &note.id);
        if next_id == self.note_id.as_ref() {
            return;
        }

        self.saves.cancel();
        self.preview = false;
        match note {
            Some(note) => {
                self.note_id = Some(note.id.clone());
                self.title.clone_from(&note.title);
                self.content.clone_from(&note.content);
            }
            None => {
                self.note_id = None;
                self.title.clear();
                self.content.clear();
            }
        }
    }

    #[must_use]
    pub const fn note_id(&self) -> Option<&NoteId> {
        self.note_id.as_ref()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns false when no note is loaded.
    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let Some(id) = self.note_id.clone() else {
            return false;
        };
        self.title = title.into();
        self.saves.schedule(&id, NotePatch::title(self.title.clone()));
        true
    }

    /// Returns false when no note is loaded.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let Some(id) = self.note_id.clone() else {
            return false;
        };
        self.content = content.into();
        self.saves.schedule(&id, NotePatch::content(self.content.clone()));
        true
    }

    pub fn toggle_preview(&mut self) -> bool {
        self.preview = !self.preview;
        self.preview
    }

    #[must_use]
    pub const fn is_preview(&self) -> bool {
        self.preview
    }

    #[must_use]
    pub fn has_pending_save(&self) -> bool {
        self.saves.has_pending()
    }

    pub async fn next_save(&mut self) -> ScheduledSave {
        self.saves.next_due().await
    }

    pub fn flush(&mut self) -> Option<ScheduledSave> {
        self.saves.flush()
    }

    /// Forget unsaved edits for a note that no longer exists.
    pub fn discard_saves_for(&mut self, note_id: &NoteId) {
        self.saves.discard(note_id);
    }

    /// Tear down: drop any pending save and unload the note.
    pub fn close(&mut self) {
        self.load(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(id: &str, title: &str, content: &str) -> Note {
        let mut note = Note::new_empty();
        note.id = NoteId::from(id);
        note.title = title.to_string();
        note.content = content.to_string();
        note
    }

    async fn assert_no_save(editor: &mut NoteEditor) {
        let outcome = tokio::time::timeout(Duration::from_secs(5), editor.next_save()).await;
        assert!(outcome.is_err(), "unexpected save: {outcome:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn discard_drops_due_and_pending_saves_for_one_note() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        editor.set_title("due");
        tokio::time::sleep(Duration::from_millis(600)).await;
        editor.load(Some(&note("n2", "", "")));
        editor.set_title("kept");

        editor.discard_saves_for(&NoteId::from("n1"));

        let save = editor.next_save().await;
        assert_eq!(save.note_id, NoteId::from("n2"));
        assert_no_save(&mut editor).await;
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_keystrokes_produces_one_save() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));

        for text in ["a", "ab", "abc"] {
            editor.set_content(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let save = editor.next_save().await;
        assert_eq!(save.note_id, NoteId::from("n1"));
        assert_eq!(save.patch, NotePatch::content("abc"));
        assert_no_save(&mut editor).await;
    }

    #[tokio::test(start_paused = true)]
    async fn pause_between_keystrokes_produces_two_saves() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));

        editor.set_content("a");
        tokio::time::sleep(Duration::from_millis(600)).await;
        editor.set_content("ab");

        assert_eq!(editor.next_save().await.patch, NotePatch::content("a"));
        assert_eq!(editor.next_save().await.patch, NotePatch::content("ab"));
        assert_no_save(&mut editor).await;
    }

    #[tokio::test(start_paused = true)]
    async fn save_waits_for_full_quiet_period() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        editor.set_content("x");

        let early = tokio::time::timeout(Duration::from_millis(499), editor.next_save()).await;
        assert!(early.is_err());
        assert_eq!(editor.next_save().await.patch, NotePatch::content("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn title_and_content_edits_coalesce() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        editor.set_title("Groceries");
        editor.set_content("- milk");

        let save = editor.next_save().await;
        assert_eq!(save.patch.title.as_deref(), Some("Groceries"));
        assert_eq!(save.patch.content.as_deref(), Some("- milk"));
        assert!(save.patch.tags.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn switching_notes_cancels_pending_save() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        editor.set_content("typed into n1");

        editor.load(Some(&note("n2", "Second", "persisted")));
        assert_eq!(editor.content(), "persisted");
        assert!(!editor.has_pending_save());
        assert_no_save(&mut editor).await;
    }

    #[tokio::test(start_paused = true)]
    async fn due_save_keeps_its_note_id_after_switch() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        editor.set_content("for n1");
        tokio::time::sleep(Duration::from_millis(600)).await;

        editor.load(Some(&note("n2", "", "")));
        let save = editor.next_save().await;
        assert_eq!(save.note_id, NoteId::from("n1"));
    }

    #[tokio::test(start_paused = true)]
    async fn reloading_same_note_keeps_local_copy() {
        let mut editor = NoteEditor::new();
        let stale = note("n1", "Old", "old body");
        editor.load(Some(&stale));
        editor.set_content("fresh body");

        editor.load(Some(&stale));
        assert_eq!(editor.content(), "fresh body");
        assert!(editor.has_pending_save());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_returns_pending_save_immediately() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        editor.set_title("Now");

        let save = editor.flush().unwrap();
        assert_eq!(save.patch, NotePatch::title("Now"));
        assert!(editor.flush().is_none());
        assert_no_save(&mut editor).await;
    }

    #[tokio::test(start_paused = true)]
    async fn close_drops_pending_save() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        editor.set_content("discard me");
        editor.close();

        assert!(editor.note_id().is_none());
        assert_no_save(&mut editor).await;
    }

    #[tokio::test]
    async fn edits_without_note_are_ignored() {
        let mut editor = NoteEditor::new();
        assert!(!editor.set_content("orphan"));
        assert!(!editor.has_pending_save());
    }

    #[tokio::test]
    async fn preview_resets_on_note_switch() {
        let mut editor = NoteEditor::new();
        editor.load(Some(&note("n1", "", "")));
        assert!(editor.toggle_preview());
        assert!(editor.is_preview());

        editor.load(Some(&note("n1", "", "")));
        assert!(editor.is_preview());

        editor.load(Some(&note("n2", "", "")));
        assert!(!editor.is_preview());
    }
}
