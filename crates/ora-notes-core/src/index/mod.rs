//! Index abstraction for ora-notes.
//!
//! The [`Index`] trait is the single contract for populating and querying a
//! note index. Two backends implement it: [`MemoryIndex`] here (ephemeral,
//! brute-force) and the SQLite FTS5 backend in the app crate (durable,
//! tokenized). Callers get a `Box<dyn Index>` from the app crate's factory
//! and never look at the concrete type.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`index_note`](Index::index_note) | Upsert a note keyed by its ID |
//! | [`query`](Index::query) | AND-match text tokens and tags, truncate to `top_k` |
//! | [`close`](Index::close) | Flush and release the backend |
//!
//! All calls are synchronous. Mutation takes `&mut self`, so sharing one
//! index across threads needs external serialization.

pub mod memory;

pub use memory::MemoryIndex;

use crate::error::{IndexError, IndexResult};
use crate::models::{Note, Snippet};

pub trait Index: Send {
    /// Insert or fully replace the document for `note.id`.
    ///
    /// Repeating the call is idempotent; calls for distinct IDs commute.
    fn index_note(&mut self, note: &Note) -> IndexResult<()>;

    /// Return at most `top_k` snippets whose content contains every
    /// whitespace-separated token of `text` and whose tags include every
    /// entry of `tags` (case-insensitive).
    ///
    /// Empty `text` matches on tags alone; empty `text` and `tags` match
    /// everything. `top_k <= 0` means no limit. No hits is `Ok(vec![])`.
    fn query(&self, text: &str, top_k: i64, tags: &[String]) -> IndexResult<Vec<Snippet>>;

    /// Release backend resources. Consumes the index, so it cannot be
    /// queried afterwards.
    fn close(self: Box<Self>) -> IndexResult<()>;
}

/// Upsert every note in order, stopping at the first failure.
///
/// Returns the number of notes indexed.
pub fn index_all<'a, I>(index: &mut dyn Index, notes: I) -> IndexResult<usize>
where
    I: IntoIterator<Item = &'a Note>,
{
    let mut count = 0;
    for note in notes {
        index.index_note(note)?;
        count += 1;
    }
    Ok(count)
}

/// Map the contract's `top_k` onto an optional limit.
pub fn result_limit(top_k: i64) -> Option<usize> {
    if top_k <= 0 {
        None
    } else {
        Some(usize::try_from(top_k).unwrap_or(usize::MAX))
    }
}

/// Lower-cased whitespace tokens of a query string.
pub fn query_tokens(text: &str) -> Vec<String> {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Reject notes the engine cannot key.
pub fn validate_note(note: &Note) -> IndexResult<()> {
    if note.id.trim().is_empty() {
        return Err(IndexError::Config("note id must not be empty".to_string()));
    }
    Ok(())
}
