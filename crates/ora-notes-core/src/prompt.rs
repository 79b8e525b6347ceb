//! Prompt assembly from query results.
//!
//! Retrieved excerpts become the grounding context for a language-model
//! call. Excerpts are joined in the order the index returned them; nothing
//! is filtered or de-duplicated here.

use serde::Deserialize;

use crate::models::Snippet;

/// Separator placed between excerpts in the assembled context.
pub const CONTEXT_DELIMITER: &str = "\n---\n";

const CONTEXT_PLACEHOLDER: &str = "{{context}}";
const QUESTION_PLACEHOLDER: &str = "{{question}}";

/// Leading role markers some chat templates leak into replies.
const ROLE_PREFIXES: &[&str] = &[
    "**.assistant",
    "**assistant",
    "assistant:",
    "Assistant:",
    "<|assistant|>",
    "assistant",
];

/// System and user prompt pair with `{{context}}` / `{{question}}` slots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AskTemplate {
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub user: String,
}

impl Default for AskTemplate {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant. Answer using only the notes provided.".to_string(),
            user: "Answer based on the following notes:\n{{context}}\nQuestion: {{question}}"
                .to_string(),
        }
    }
}

/// A template with both placeholders filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl AskTemplate {
    /// True when neither field carries any text.
    pub fn is_blank(&self) -> bool {
        self.system.trim().is_empty() && self.user.trim().is_empty()
    }

    pub fn render(&self, question: &str, context: &str) -> RenderedPrompt {
        let fill = |s: &str| {
            s.replace(QUESTION_PLACEHOLDER, question)
                .replace(CONTEXT_PLACEHOLDER, context)
        };
        RenderedPrompt {
            system: fill(&self.system),
            user: fill(&self.user),
        }
    }
}

/// Concatenate snippet excerpts in result order.
pub fn build_context(snippets: &[Snippet], delimiter: &str) -> String {
    snippets
        .iter()
        .map(|s| s.excerpt.as_str())
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Strip one leaked role marker from the start of a model reply.
pub fn sanitize_reply(reply: &str) -> String {
    let t = reply.trim_start_matches(&['\n', '\r', ' ', '\t'][..]);
    for prefix in ROLE_PREFIXES {
        if let Some(rest) = t.strip_prefix(prefix) {
            return rest
                .trim_start_matches(&['\n', '\r', ' ', '\t', ':', '>'][..])
                .to_string();
        }
    }
    t.to_string()
}

/// Short listing of the top `n` excerpts, used when the model reply is empty.
pub fn fallback_from_snippets(snippets: &[Snippet], n: usize) -> String {
    if snippets.is_empty() {
        return "No reply from the model.".to_string();
    }
    let n = if n == 0 { 3 } else { n }.min(snippets.len());
    let lines: Vec<String> = snippets[..n]
        .iter()
        .map(|s| {
            let text = s.excerpt.trim();
            if text.is_empty() {
                format!("- {}", s.note_id)
            } else {
                format!("- {}", text)
            }
        })
        .collect();
    format!(
        "No reply from the model; related notes:\n{}",
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snip(id: &str, excerpt: &str) -> Snippet {
        Snippet {
            note_id: id.to_string(),
            excerpt: excerpt.to_string(),
            score: 1.0,
            tag_matches: Vec::new(),
        }
    }

    #[test]
    fn context_keeps_query_order() {
        let snippets = vec![snip("b", "second"), snip("a", "first"), snip("c", "second")];
        assert_eq!(
            build_context(&snippets, CONTEXT_DELIMITER),
            "second\n---\nfirst\n---\nsecond"
        );
        assert_eq!(build_context(&[], CONTEXT_DELIMITER), "");
    }

    #[test]
    fn render_fills_both_fields() {
        let tpl = AskTemplate {
            system: "Q={{question}}".to_string(),
            user: "C={{context}} Q={{question}}".to_string(),
        };
        let out = tpl.render("why?", "notes");
        assert_eq!(out.system, "Q=why?");
        assert_eq!(out.user, "C=notes Q=why?");
    }

    #[test]
    fn default_template_has_placeholders() {
        let tpl = AskTemplate::default();
        assert!(tpl.user.contains("{{context}}"));
        assert!(tpl.user.contains("{{question}}"));
        assert!(!tpl.is_blank());
    }

    #[test]
    fn sanitize_strips_role_markers() {
        assert_eq!(sanitize_reply("\n assistant: hello"), "hello");
        assert_eq!(sanitize_reply("<|assistant|>\n> hi"), "hi");
        assert_eq!(sanitize_reply("**.assistant\nanswer"), "answer");
        assert_eq!(sanitize_reply("plain answer"), "plain answer");
        assert_eq!(sanitize_reply("assistant"), "");
    }

    #[test]
    fn fallback_lists_top_excerpts() {
        let snippets = vec![snip("n1", "one"), snip("n2", "  "), snip("n3", "three"), snip("n4", "four")];
        let out = fallback_from_snippets(&snippets, 3);
        assert!(out.contains("- one"));
        assert!(out.contains("- n2"));
        assert!(out.contains("- three"));
        assert!(!out.contains("four"));
    }

    #[test]
    fn fallback_without_snippets() {
        assert_eq!(fallback_from_snippets(&[], 3), "No reply from the model.");
    }
}
