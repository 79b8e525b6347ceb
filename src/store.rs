//! JSONL note persistence.
//!
//! Notes are appended one JSON object per line to daily files named
//! `YYYY-MM-DD.jsonl` (UTC date of `created_at`). The store is the source
//! of truth; the index is rebuilt from it.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use ora_notes_core::Note;

pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    /// Open (and create if needed) the notes directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            bail!("notes directory must not be empty");
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create notes directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn day_file(&self, note: &Note) -> PathBuf {
        self.dir
            .join(format!("{}.jsonl", note.created_at.format("%Y-%m-%d")))
    }

    /// Append `note` to its daily file.
    pub fn save(&self, note: &Note) -> Result<()> {
        if note.id.trim().is_empty() {
            bail!("note id must not be empty");
        }
        let path = self.day_file(note);
        let line = serde_json::to_string(note)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        writeln!(file, "{}", line).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Every stored note, newest first. Later revisions of the same ID win.
    pub fn list(&self) -> Result<Vec<Note>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        files.sort();

        let mut latest: HashMap<String, Note> = HashMap::new();
        for path in &files {
            let file =
                fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            for (i, line) in BufReader::new(file).lines().enumerate() {
                let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
                if line.trim().is_empty() {
                    continue;
                }
                let note: Note = serde_json::from_str(&line).with_context(|| {
                    format!("{}:{}: malformed note record", path.display(), i + 1)
                })?;
                match latest.get(&note.id) {
                    Some(existing) if existing.updated_at > note.updated_at => {}
                    _ => {
                        latest.insert(note.id.clone(), note);
                    }
                }
            }
        }

        let mut notes: Vec<Note> = latest.into_values().collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(notes)
    }
}
