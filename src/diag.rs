//! `ora diag`: environment checks.
//!
//! Reports whether the LLM host answers, whether the notes directory is
//! writable, and whether a template path can be read. Every check is
//! reported; none of them fails the command.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Outcome of all checks.
#[derive(Debug)]
pub struct DiagReport {
    pub llm: std::result::Result<(), String>,
    pub notes_dir: std::result::Result<(), String>,
    /// `None` when no template path was given.
    pub template: Option<std::result::Result<(), String>>,
}

impl DiagReport {
    pub fn all_ok(&self) -> bool {
        self.llm.is_ok()
            && self.notes_dir.is_ok()
            && self.template.as_ref().map_or(true, |t| t.is_ok())
    }
}

impl fmt::Display for DiagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.llm {
            Ok(()) => writeln!(f, "LLM: reachable")?,
            Err(e) => writeln!(f, "LLM: unreachable ({})", e)?,
        }
        match &self.notes_dir {
            Ok(()) => writeln!(f, "NotesDir: writable")?,
            Err(e) => writeln!(f, "NotesDir: not writable ({})", e)?,
        }
        match &self.template {
            None => write!(f, "Template: skipped (no path)"),
            Some(Ok(())) => write!(f, "Template: ok"),
            Some(Err(e)) => write!(f, "Template: not found ({})", e),
        }
    }
}

/// Create `dir` if needed, then write and remove a probe file in it.
pub fn check_writable(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let probe = dir.join(format!(".probe-{}", uuid::Uuid::new_v4()));
    fs::write(&probe, b"").with_context(|| format!("write {}", probe.display()))?;
    fs::remove_file(&probe).with_context(|| format!("remove {}", probe.display()))?;
    Ok(())
}

pub fn check_template(path: &Path) -> Result<()> {
    fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    Ok(())
}

/// Run every check. `ping` probes the LLM host.
pub fn run_diag<F>(ping: F, notes_dir: &Path, template: Option<&Path>) -> DiagReport
where
    F: FnOnce() -> Result<()>,
{
    let flatten = |r: Result<()>| r.map_err(|e| format!("{:#}", e));
    let report = DiagReport {
        llm: flatten(ping()),
        notes_dir: flatten(check_writable(notes_dir)),
        template: template
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| flatten(check_template(p))),
    };
    tracing::info!(ok = report.all_ok(), "diagnostics finished");
    report
}
