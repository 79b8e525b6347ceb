//! `ora ask`: retrieve notes, then ask the model about them.
//!
//! The pipeline queries the index, folds the excerpts into the prompt
//! template, calls the [`ChatModel`], and cleans up the reply. The model and
//! the output writers are injected so the whole flow runs in tests without
//! a network.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use ora_notes_core::prompt::{build_context, fallback_from_snippets, sanitize_reply, CONTEXT_DELIMITER};
use ora_notes_core::{Index, Snippet};

use crate::llm::{ChatModel, ChatOptions};
use crate::prompt::load_ask_template;

pub const NO_RESULTS: &str =
    "No relevant notes found. Try other keywords or drop the tag filter.";

/// Number of excerpts listed when the model gives an empty reply.
const FALLBACK_SNIPPETS: usize = 3;

#[derive(Debug, Clone)]
pub struct AskRequest {
    pub question: String,
    pub tags: Vec<String>,
    pub top_k: i64,
    pub no_llm: bool,
    pub template: Option<PathBuf>,
    pub options: ChatOptions,
}

/// Run one question against `index`, writing the answer to `out` and
/// warnings to `err`. The index is closed before returning, on every path.
pub fn run_ask(
    index: Box<dyn Index>,
    req: &AskRequest,
    model: &dyn ChatModel,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let result = ask_with_index(&*index, req, model, out, err);
    let closed = index.close().context("close index");
    result?;
    closed
}

fn ask_with_index(
    index: &dyn Index,
    req: &AskRequest,
    model: &dyn ChatModel,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let question = req.question.trim();
    if question.is_empty() {
        bail!("missing question");
    }

    let snippets = index
        .query(question, req.top_k, &req.tags)
        .context("query")?;
    tracing::info!(hits = snippets.len(), "retrieved snippets");

    if req.no_llm {
        for s in &snippets {
            writeln!(out, "{}", s.note_id)?;
        }
        return Ok(());
    }
    if snippets.is_empty() {
        writeln!(out, "{}", NO_RESULTS)?;
        return Ok(());
    }

    let answer = answer_from_snippets(question, &snippets, req, model, err)?;
    writeln!(out, "{}", answer)?;
    Ok(())
}

fn answer_from_snippets(
    question: &str,
    snippets: &[Snippet],
    req: &AskRequest,
    model: &dyn ChatModel,
    err: &mut dyn Write,
) -> Result<String> {
    let context = build_context(snippets, CONTEXT_DELIMITER);
    let (template, warning) = load_ask_template(req.template.as_deref());
    if let Some(w) = warning {
        writeln!(err, "{}", w)?;
    }
    let prompt = template.render(question, &context);

    let reply = model
        .chat(&prompt.system, &prompt.user, &req.options)
        .context("llm")?;
    let cleaned = sanitize_reply(&reply);
    if cleaned.trim().is_empty() {
        tracing::warn!("model returned an empty reply; listing excerpts instead");
        return Ok(fallback_from_snippets(snippets, FALLBACK_SNIPPETS));
    }
    Ok(cleaned)
}
