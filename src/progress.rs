//! Reindex progress reporting.
//!
//! Progress goes to **stderr** so stdout stays parseable for scripts.
//! Humans get a line per step when stderr is a terminal; `--json-progress`
//! switches to one JSON object per line.

use std::io::Write;

/// Emit a progress line every this many notes.
pub const REPORT_EVERY: u64 = 100;

#[derive(Clone, Debug, PartialEq)]
pub enum ReindexEvent {
    /// Reading the note store.
    Loading,
    /// `n` of `total` notes upserted.
    Indexing { n: u64, total: u64 },
    Done { total: u64 },
}

pub trait ProgressReporter {
    fn report(&self, event: ReindexEvent);
}

/// Human-friendly lines: "reindex  indexing  1,200 / 5,000 notes".
pub struct StderrProgress;

impl StderrProgress {
    fn line(event: &ReindexEvent) -> String {
        match event {
            ReindexEvent::Loading => "reindex  loading notes...".to_string(),
            ReindexEvent::Indexing { n, total } => format!(
                "reindex  indexing  {} / {} notes",
                format_number(*n),
                format_number(*total)
            ),
            ReindexEvent::Done { total } => {
                format!("reindex  done  {} notes", format_number(*total))
            }
        }
    }
}

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ReindexEvent) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", Self::line(&event));
        let _ = err.flush();
    }
}

/// Machine-readable progress on stderr.
pub struct JsonProgress;

impl JsonProgress {
    fn value(event: &ReindexEvent) -> serde_json::Value {
        match event {
            ReindexEvent::Loading => serde_json::json!({
                "event": "progress",
                "phase": "loading"
            }),
            ReindexEvent::Indexing { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "indexing",
                "n": n,
                "total": total
            }),
            ReindexEvent::Done { total } => serde_json::json!({
                "event": "done",
                "total": total
            }),
        }
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ReindexEvent) {
        if let Ok(line) = serde_json::to_string(&Self::value(&event)) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ReindexEvent) {}
}

fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// JSON when asked for, otherwise human output only on a terminal.
    pub fn select(json: bool) -> Self {
        if json {
            ProgressMode::Json
        } else if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
