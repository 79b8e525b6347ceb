//! In-memory [`Index`] implementation.
//!
//! A `HashMap` keyed by note ID. Queries are a brute-force filter: every
//! stored note is checked for substring containment of each query token
//! and for every requested tag. Hits are not ranked and all carry a fixed
//! score of `1.0`. Results are ordered by `created_at` (newest first), then
//! by ID, so truncation to `top_k` is stable across runs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::IndexResult;
use crate::excerpt::{excerpt, DEFAULT_EXCERPT_RUNES};
use crate::models::{Note, Snippet};
use crate::tags;

use super::{query_tokens, result_limit, validate_note, Index};

/// Score given to every in-memory hit.
pub const MEMORY_SCORE: f64 = 1.0;

/// The queryable projection of a note.
struct StoredNote {
    content: String,
    content_lower: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

/// Ephemeral index. Dropping it discards everything.
#[derive(Default)]
pub struct MemoryIndex {
    notes: HashMap<String, StoredNote>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl StoredNote {
    fn matches(&self, tokens: &[String], wanted_tags: &[String]) -> bool {
        tokens.iter().all(|t| self.content_lower.contains(t.as_str()))
            && wanted_tags.iter().all(|t| self.tags.contains(t))
    }
}

impl Index for MemoryIndex {
    fn index_note(&mut self, note: &Note) -> IndexResult<()> {
        validate_note(note)?;
        self.notes.insert(
            note.id.clone(),
            StoredNote {
                content: note.content.clone(),
                content_lower: note.content.to_lowercase(),
                tags: note.tags.iter().map(|t| tags::normalize_tag(t)).collect(),
                created_at: note.created_at,
            },
        );
        Ok(())
    }

    fn query(&self, text: &str, top_k: i64, tags: &[String]) -> IndexResult<Vec<Snippet>> {
        let tokens = query_tokens(text);
        let wanted: Vec<String> = tags
            .iter()
            .map(|t| tags::normalize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();

        let mut hits: Vec<(&String, &StoredNote)> = self
            .notes
            .iter()
            .filter(|(_, stored)| stored.matches(&tokens, &wanted))
            .collect();
        hits.sort_by(|(a_id, a), (b_id, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| a_id.cmp(b_id))
        });
        if let Some(limit) = result_limit(top_k) {
            hits.truncate(limit);
        }

        Ok(hits
            .into_iter()
            .map(|(id, stored)| Snippet {
                note_id: id.clone(),
                excerpt: excerpt(&stored.content, DEFAULT_EXCERPT_RUNES),
                score: MEMORY_SCORE,
                tag_matches: tags::tag_matches(&stored.tags, tags),
            })
            .collect())
    }

    fn close(self: Box<Self>) -> IndexResult<()> {
        Ok(())
    }
}
