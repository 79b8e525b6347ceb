//! `ora reindex`: rebuild the index from the note store.

use anyhow::{Context, Result};

use ora_notes_core::Index;

use crate::progress::{ProgressReporter, ReindexEvent, REPORT_EVERY};
use crate::store::NoteStore;

/// Upsert every stored note into `index`. Returns the number indexed.
pub fn reindex(
    store: &NoteStore,
    index: &mut dyn Index,
    progress: &dyn ProgressReporter,
) -> Result<usize> {
    progress.report(ReindexEvent::Loading);
    let notes = store.list().context("load notes")?;
    let total = notes.len() as u64;

    for (i, note) in notes.iter().enumerate() {
        index
            .index_note(note)
            .with_context(|| format!("index note {}", note.id))?;
        let n = i as u64 + 1;
        if n % REPORT_EVERY == 0 || n == total {
            progress.report(ReindexEvent::Indexing { n, total });
        }
    }
    progress.report(ReindexEvent::Done { total });
    tracing::info!(count = total, "reindex complete");
    Ok(notes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use ora_notes_core::{MemoryIndex, Note};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<ReindexEvent>>);

    impl ProgressReporter for Recorder {
        fn report(&self, event: ReindexEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn reindex_loads_every_note_and_reports() {
        let tmp = TempDir::new().unwrap();
        let store = NoteStore::open(tmp.path()).unwrap();
        for c in ["one", "two", "three"] {
            store.save(&Note::new(c, &[])).unwrap();
        }
        let mut index = MemoryIndex::new();
        let recorder = Recorder::default();

        assert_eq!(reindex(&store, &mut index, &recorder).unwrap(), 3);
        assert_eq!(index.len(), 3);
        assert_eq!(
            recorder.0.into_inner(),
            vec![
                ReindexEvent::Loading,
                ReindexEvent::Indexing { n: 3, total: 3 },
                ReindexEvent::Done { total: 3 },
            ]
        );
    }
}
