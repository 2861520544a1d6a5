//! Presentation state for the note list and the editor.

pub mod editor;
pub mod list;

pub use editor::{NoteEditor, SaveDebouncer, ScheduledSave, SAVE_DEBOUNCE};
pub use list::{footer_count, NoteListItem, EMPTY_STATE};
