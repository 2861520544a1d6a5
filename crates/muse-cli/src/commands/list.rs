use chrono::Utc;
use muse_core::app::NotesApp;
use muse_core::store::NoteStore;
use muse_core::views::EMPTY_STATE;
use muse_core::NoteTag;

use crate::commands::common::format_item_lines;
use crate::error::CliError;

pub fn run_list<S: NoteStore>(
    app: &mut NotesApp<S>,
    tag: Option<NoteTag>,
    search: Option<&str>,
    as_json: bool,
) -> Result<(), CliError> {
    app.filter_by_tag(tag);
    app.set_search(search.unwrap_or_default());
    let items = app.visible_items(Utc::now());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("{EMPTY_STATE}");
    } else {
        for line in format_item_lines(&items) {
            println!("{line}");
        }
    }
    println!("{}", app.footer());
    Ok(())
}
