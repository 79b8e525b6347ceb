//! Backend selection.
//!
//! [`open_or_create`] is the only place that decides which [`Index`]
//! implementation a caller gets.

use std::path::Path;

use ora_notes_core::{Index, IndexResult, MemoryIndex, Note};

use crate::sqlite_index::{FullTextIndex, DB_FILE};

/// Open the index rooted at `path`.
///
/// An empty path yields a fresh in-memory index that touches no disk and
/// shares nothing with any other instance. Any other path opens (or
/// creates) the durable full-text index there.
pub fn open_or_create(path: impl AsRef<Path>) -> IndexResult<Box<dyn Index>> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        tracing::debug!("using in-memory index");
        return Ok(Box::new(MemoryIndex::new()));
    }
    Ok(Box::new(FullTextIndex::open(path)?))
}

/// Open the index and, when `rebuild` is set and the index starts out
/// empty, upsert every note into it.
///
/// An in-memory index always starts empty. A durable index starts empty
/// only when its database file does not exist yet; an existing one is
/// kept current by `add` and refreshed explicitly by `reindex`.
pub fn open_and_rebuild(
    path: impl AsRef<Path>,
    notes: &[Note],
    rebuild: bool,
) -> IndexResult<Box<dyn Index>> {
    let path = path.as_ref();
    let fresh = path.as_os_str().is_empty() || !path.join(DB_FILE).exists();
    let index = open_or_create(path)?;
    if rebuild && fresh {
        return populate(index, notes);
    }
    Ok(index)
}

/// Upsert `notes` into `index`. On failure the index is closed and the
/// indexing error is returned; a close error on that path is logged.
fn populate(mut index: Box<dyn Index>, notes: &[Note]) -> IndexResult<Box<dyn Index>> {
    if let Err(e) = ora_notes_core::index::index_all(index.as_mut(), notes) {
        if let Err(close_err) = index.close() {
            tracing::warn!(error = %close_err, "failed to close index after indexing error");
        }
        return Err(e);
    }
    tracing::debug!(count = notes.len(), "rebuilt index from note store");
    Ok(index)
}
