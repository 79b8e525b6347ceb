//! Core data models shared by the indexing engine and its callers.
//!
//! A [`Note`] is owned by the note-storage layer and handed to an
//! [`Index`](crate::index::Index); a [`Snippet`] is what a query returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tags;

/// A single user note.
///
/// Serialized with snake_case keys, one JSON object per line in the
/// note store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a note with a fresh UUIDv4 and both timestamps set to now.
    ///
    /// Tags are normalized and de-duplicated.
    pub fn new(content: impl Into<String>, tags: &[String]) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            tags: tags::merge_tags(tags, &[]),
            created_at: now,
            updated_at: now,
        }
    }

    /// True if the note carries `tag`, compared case-insensitively.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tags::normalize_tag(tag);
        self.tags.iter().any(|t| tags::normalize_tag(t) == wanted)
    }
}

/// One query hit.
///
/// `score` is the backend's own relevance value. Scores from the
/// in-memory and full-text backends are on different scales and must not
/// be compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    pub note_id: String,
    pub excerpt: String,
    pub score: f64,
    /// Queried tags present on the note, in query order.
    pub tag_matches: Vec<String>,
}
