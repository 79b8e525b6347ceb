//! `ora search`: print matching notes, one per line.

use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result};

use ora_notes_core::excerpt::{centered_excerpt, DEFAULT_EXCERPT_RUNES};
use ora_notes_core::index::query_tokens;
use ora_notes_core::{Index, Note, Snippet};

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub tags: Vec<String>,
    pub limit: i64,
    /// Re-cut each excerpt around the first query token.
    pub centered: bool,
}

/// Query `index` and write `<id>  <score>  <excerpt>` lines to `out`.
///
/// `notes` supplies full content for centered excerpts; hits whose note is
/// not in it keep the index excerpt. Returns the number of hits.
pub fn run_search(
    index: &dyn Index,
    notes: &[Note],
    req: &SearchRequest,
    out: &mut dyn Write,
) -> Result<usize> {
    let snippets = index
        .query(&req.query, req.limit, &req.tags)
        .context("query")?;
    if snippets.is_empty() {
        writeln!(out, "No results.")?;
        return Ok(0);
    }

    let keyword = query_tokens(&req.query).into_iter().next();
    let by_id: HashMap<&str, &Note> = if req.centered {
        notes.iter().map(|n| (n.id.as_str(), n)).collect()
    } else {
        HashMap::new()
    };

    for s in &snippets {
        let text = match (&keyword, by_id.get(s.note_id.as_str())) {
            (Some(k), Some(note)) => centered_excerpt(&note.content, k, DEFAULT_EXCERPT_RUNES),
            _ => s.excerpt.clone(),
        };
        writeln!(out, "{}", format_hit(s, &text))?;
    }
    Ok(snippets.len())
}

fn format_hit(s: &Snippet, text: &str) -> String {
    let one_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut line = format!("{}  {:.3}  {}", s.note_id, s.score, one_line);
    if !s.tag_matches.is_empty() {
        line.push_str(&format!("  [{}]", s.tag_matches.join(",")));
    }
    line
}
