//! Ask-template loading.
//!
//! Template files are TOML with optional `system` and `user` keys:
//!
//! ```toml
//! system = "Answer tersely."
//! user = "Notes:\n{{context}}\n\nQ: {{question}}"
//! ```
//!
//! Loading never fails. A bad template falls back to the built-in one and
//! the caller gets a warning to show the user.

use std::path::Path;

use ora_notes_core::prompt::AskTemplate;

pub const WARN_NOT_FOUND: &str = "template not found; using default";
pub const WARN_INVALID: &str = "template invalid or missing keys; using default";

/// Load a template from `path`, or the default when `path` is `None`.
pub fn load_ask_template(path: Option<&Path>) -> (AskTemplate, Option<&'static str>) {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return (AskTemplate::default(), None);
    };
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot read template");
            return (AskTemplate::default(), Some(WARN_NOT_FOUND));
        }
    };
    match toml::from_str::<AskTemplate>(&content) {
        Ok(tpl) if !tpl.is_blank() => (tpl, None),
        _ => (AskTemplate::default(), Some(WARN_INVALID)),
    }
}
