//! muse-core - Core library for Mindful Muse
//!
//! Notes and their tag vocabulary, the local and Supabase-backed note stores,
//! the debounced editor save path, the list view, and the auth and email
//! verification flows. The CLI assembles these against a concrete backend.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod session;
pub mod store;
pub mod util;
pub mod verification;
pub mod views;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::{Note, NoteId, NotePatch, NoteTag};
