//! `ora add`: capture a note.

use anyhow::{bail, Context, Result};

use ora_notes_core::tags::{extract_hashtags, merge_tags};
use ora_notes_core::{Index, Note};

use crate::store::NoteStore;

/// Save a new note and index it.
///
/// Tags are the explicit `tags` merged with any `#hashtags` in the content.
/// The note is written to the store before it is indexed, so an indexing
/// failure never loses it.
pub fn add_note(
    store: &NoteStore,
    index: &mut dyn Index,
    content: &str,
    tags: &[String],
) -> Result<Note> {
    let content = content.trim();
    if content.is_empty() {
        bail!("note content must not be empty");
    }
    let tags = merge_tags(tags, &extract_hashtags(content));
    let note = Note::new(content, &tags);

    store.save(&note).context("save note")?;
    index.index_note(&note).context("index note")?;
    tracing::info!(id = %note.id, tags = ?note.tags, "added note");
    Ok(note)
}
