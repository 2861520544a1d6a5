//! Data models for Muse

mod note;
mod tag;

pub use note::{Note, NoteId, NotePatch};
pub use tag::NoteTag;
