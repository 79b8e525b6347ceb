//! SQLite FTS5 implementation of [`Index`].
//!
//! The index root is a directory holding a single `index.sqlite` file.
//! Note content goes into an FTS5 table (tokenized, BM25-scored) keyed by
//! the `notes` rowid; tags go into a plain table and are matched exactly,
//! unscored.
//!
//! Scores are the negated BM25 rank, so higher is more relevant. Queries
//! without text have no relevance signal and every hit scores `1.0`.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use ora_notes_core::excerpt::{excerpt, DEFAULT_EXCERPT_RUNES};
use ora_notes_core::index::{query_tokens, result_limit, validate_note};
use ora_notes_core::tags::normalize_tag;
use ora_notes_core::{Index, IndexError, IndexResult, Note, Snippet};

/// File name of the database inside the index root.
pub const DB_FILE: &str = "index.sqlite";

const SCHEMA_VERSION: i64 = 2;

/// Durable full-text index.
pub struct FullTextIndex {
    conn: Connection,
    path: PathBuf,
}

impl FullTextIndex {
    /// Open the index rooted at `root`, creating the directory and schema
    /// when absent. Existing documents are kept.
    pub fn open(root: &Path) -> IndexResult<Self> {
        fs::create_dir_all(root).map_err(|e| IndexError::io("create index dir", root, e))?;
        let path = root.join(DB_FILE);
        let conn = Connection::open(&path).map_err(|e| IndexError::backend(&path, e))?;

        let mut index = Self { conn, path };
        index.init_schema()?;
        tracing::debug!(path = %index.path.display(), "opened full-text index");
        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backend_err(&self, e: rusqlite::Error) -> IndexError {
        IndexError::backend(&self.path, e)
    }

    fn init_schema(&mut self) -> IndexResult<()> {
        self.conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
            .map_err(|e| self.backend_err(e))?;

        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| self.backend_err(e))?;
        if version == SCHEMA_VERSION {
            return Ok(());
        }
        if version > SCHEMA_VERSION {
            return Err(IndexError::Config(format!(
                "index at {} has schema version {}, newer than supported {}",
                self.path.display(),
                version,
                SCHEMA_VERSION
            )));
        }

        // Version 1 keyed the FTS table by an unindexed note id column.
        // The FTS table is rebuilt from `notes`; notes and tags are kept.
        self.conn
            .execute_batch(
                r#"
                BEGIN;
                CREATE TABLE IF NOT EXISTS notes (
                    id TEXT PRIMARY KEY,
                    content TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS note_tags (
                    note_id TEXT NOT NULL,
                    tag TEXT NOT NULL,
                    PRIMARY KEY (note_id, tag)
                );
                CREATE INDEX IF NOT EXISTS idx_note_tags_tag ON note_tags(tag);
                DROP TABLE IF EXISTS notes_fts;
                CREATE VIRTUAL TABLE notes_fts USING fts5(content);
                INSERT INTO notes_fts (rowid, content) SELECT rowid, content FROM notes;
                PRAGMA user_version = 2;
                COMMIT;
                "#,
            )
            .map_err(|e| self.backend_err(e))
    }
}

/// Split query tokens into an FTS5 conjunction of quoted terms and the
/// tokens the tokenizer cannot see.
///
/// A token with no alphanumeric character produces no FTS5 term, so it is
/// returned as a literal to be matched as a substring of the content.
fn split_query(tokens: &[String]) -> (Option<String>, Vec<String>) {
    let (words, symbols): (Vec<&String>, Vec<&String>) = tokens
        .iter()
        .partition(|t| t.chars().any(char::is_alphanumeric));
    let expr = if words.is_empty() {
        None
    } else {
        let terms: Vec<String> = words
            .iter()
            .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
            .collect();
        Some(terms.join(" "))
    };
    (expr, symbols.into_iter().cloned().collect())
}

impl Index for FullTextIndex {
    fn index_note(&mut self, note: &Note) -> IndexResult<()> {
        validate_note(note)?;
        let path = self.path.clone();
        let err = |e: rusqlite::Error| IndexError::backend(&path, e);

        let tx = self.conn.transaction().map_err(err)?;
        tx.execute(
            "DELETE FROM notes_fts WHERE rowid = (SELECT rowid FROM notes WHERE id = ?1)",
            params![note.id],
        )
        .map_err(err)?;
        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", params![note.id])
            .map_err(err)?;
        tx.execute(
            r#"
            INSERT INTO notes (id, content, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                created_at = excluded.created_at
            "#,
            params![note.id, note.content, note.created_at.timestamp_millis()],
        )
        .map_err(err)?;
        tx.execute(
            "INSERT INTO notes_fts (rowid, content) SELECT rowid, content FROM notes WHERE id = ?1",
            params![note.id],
        )
        .map_err(err)?;
        for tag in &note.tags {
            let tag = normalize_tag(tag);
            if tag.is_empty() {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO note_tags (note_id, tag) VALUES (?1, ?2)",
                params![note.id, tag],
            )
            .map_err(err)?;
        }
        tx.commit().map_err(err)
    }

    fn query(&self, text: &str, top_k: i64, tags: &[String]) -> IndexResult<Vec<Snippet>> {
        let tokens = query_tokens(text);
        let wanted: Vec<String> = tags
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();

        let (expr, literals) = split_query(&tokens);

        let mut args: Vec<Value> = Vec::new();
        let mut sql = match expr {
            Some(expr) => {
                args.push(Value::Text(expr));
                "SELECT n.id, n.content, -bm25(notes_fts) AS score \
                 FROM notes_fts JOIN notes n ON n.rowid = notes_fts.rowid \
                 WHERE notes_fts MATCH ?"
                    .to_string()
            }
            None => "SELECT n.id, n.content, 1.0 AS score FROM notes n WHERE 1 = 1".to_string(),
        };
        for literal in literals {
            sql.push_str(" AND instr(lower(n.content), ?) > 0");
            args.push(Value::Text(literal));
        }
        for tag in &wanted {
            sql.push_str(" AND n.id IN (SELECT note_id FROM note_tags WHERE tag = ?)");
            args.push(Value::Text(tag.clone()));
        }
        sql.push_str(" ORDER BY score DESC, n.created_at DESC, n.id ASC LIMIT ?");
        let limit = result_limit(top_k).map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        args.push(Value::Integer(limit));

        let mut stmt = self.conn.prepare(&sql).map_err(|e| self.backend_err(e))?;
        let rows = stmt
            .query_map(params_from_iter(args), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })
            .map_err(|e| self.backend_err(e))?;

        // Every hit carries all requested tags.
        let matched: Vec<String> = tags
            .iter()
            .filter(|t| !normalize_tag(t).is_empty())
            .cloned()
            .collect();

        let mut snippets = Vec::new();
        for row in rows {
            let (note_id, content, score) = row.map_err(|e| self.backend_err(e))?;
            snippets.push(Snippet {
                note_id,
                excerpt: excerpt(&content, DEFAULT_EXCERPT_RUNES),
                score,
                tag_matches: matched.clone(),
            });
        }
        Ok(snippets)
    }

    fn close(self: Box<Self>) -> IndexResult<()> {
        let FullTextIndex { conn, path } = *self;
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            .map_err(|e| IndexError::backend(&path, e))?;
        conn.close().map_err(|(_, e)| IndexError::backend(&path, e))?;
        tracing::debug!(path = %path.display(), "closed full-text index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn note(id: &str, content: &str, tags: &[&str], minute: u32) -> Note {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap();
        Note {
            id: id.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn open_creates_root_and_db_file() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("nested").join("index");
        let idx = FullTextIndex::open(&root).unwrap();
        assert_eq!(idx.path(), root.join(DB_FILE));
        assert!(idx.path().exists());
        Box::new(idx).close().unwrap();
    }

    #[test]
    fn open_on_a_file_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        match FullTextIndex::open(&blocker.join("index")) {
            Err(IndexError::Io { path, .. }) => assert!(path.ends_with("index")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn upsert_replaces_document() {
        let tmp = TempDir::new().unwrap();
        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        idx.index_note(&note("n1", "first draft", &["old"], 0)).unwrap();
        idx.index_note(&note("n1", "second draft", &["new"], 0)).unwrap();

        assert!(idx.query("first", 0, &[]).unwrap().is_empty());
        assert!(idx.query("", 0, &strings(&["old"])).unwrap().is_empty());
        let hits = idx.query("draft", 0, &[]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].excerpt, "second draft");
    }

    #[test]
    fn text_and_tags_are_conjunctive() {
        let tmp = TempDir::new().unwrap();
        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        idx.index_note(&note("a1", "alpha widget pipeline", &["dev"], 1)).unwrap();
        idx.index_note(&note("a2", "alpha unit harness", &["Test", "dev"], 2)).unwrap();
        idx.index_note(&note("a3", "unrelated recipe", &["life"], 3)).unwrap();

        let hits = idx.query("alpha", 1, &strings(&["dev"])).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(["a1", "a2"].contains(&hits[0].note_id.as_str()));
        assert_eq!(hits[0].tag_matches, strings(&["dev"]));

        let hits = idx.query("Alpha HARNESS", 0, &[]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "a2");

        let hits = idx.query("", 0, &strings(&["DEV", "test"])).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "a2");
        assert_eq!(hits[0].score, 1.0);

        assert!(idx.query("nope", 5, &[]).unwrap().is_empty());
        assert_eq!(idx.query("", 0, &[]).unwrap().len(), 3);
    }

    #[test]
    fn symbol_words_match_as_substrings() {
        let tmp = TempDir::new().unwrap();
        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        idx.index_note(&note("p", "quote \" and star *", &[], 0)).unwrap();
        idx.index_note(&note("q", "quote without symbols", &[], 1)).unwrap();

        let hits = idx.query("\" *", 0, &[]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "p");
        assert_eq!(hits[0].score, 1.0);

        let hits = idx.query("quote *", 0, &[]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "p");

        assert!(idx.query("quote -", 0, &[]).unwrap().is_empty());
        assert_eq!(idx.query("quote\"", 0, &[]).unwrap().len(), 2);
    }

    #[test]
    fn version_one_schema_is_upgraded_in_place() {
        let tmp = TempDir::new().unwrap();
        {
            let conn = Connection::open(tmp.path().join(DB_FILE)).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE notes (id TEXT PRIMARY KEY, content TEXT NOT NULL, created_at INTEGER NOT NULL);
                CREATE TABLE note_tags (note_id TEXT NOT NULL, tag TEXT NOT NULL, PRIMARY KEY (note_id, tag));
                CREATE VIRTUAL TABLE notes_fts USING fts5(note_id UNINDEXED, content);
                INSERT INTO notes VALUES ('old', 'carried over text', 0);
                INSERT INTO note_tags VALUES ('old', 'kept');
                INSERT INTO notes_fts VALUES ('old', 'carried over text');
                PRAGMA user_version = 1;
                "#,
            )
            .unwrap();
        }

        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        let hits = idx.query("carried", 0, &strings(&["kept"])).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "old");

        idx.index_note(&note("old", "rewritten body", &[], 0)).unwrap();
        assert!(idx.query("carried", 0, &[]).unwrap().is_empty());
        assert_eq!(idx.query("rewritten", 0, &[]).unwrap().len(), 1);
        Box::new(idx).close().unwrap();
    }

    #[test]
    fn newer_schema_is_refused() {
        let tmp = TempDir::new().unwrap();
        {
            let conn = Connection::open(tmp.path().join(DB_FILE)).unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }
        assert!(matches!(
            FullTextIndex::open(tmp.path()),
            Err(IndexError::Config(_))
        ));
    }

    #[test]
    fn relevance_then_recency() {
        let tmp = TempDir::new().unwrap();
        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        idx.index_note(&note("once", "rust and other things entirely unrelated here", &[], 5))
            .unwrap();
        idx.index_note(&note("thrice", "rust rust rust", &[], 1)).unwrap();
        let hits = idx.query("rust", 0, &[]).unwrap();
        assert_eq!(hits[0].note_id, "thrice");
        assert!(hits[0].score > hits[1].score);

        idx.index_note(&note("old", "same words", &[], 1)).unwrap();
        idx.index_note(&note("new", "same words", &[], 9)).unwrap();
        let hits = idx.query("same", 0, &[]).unwrap();
        assert_eq!(hits[0].note_id, "new");
    }

    #[test]
    fn excerpt_is_rune_bounded() {
        let tmp = TempDir::new().unwrap();
        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        idx.index_note(&note("long", &"ñandú ".repeat(100), &[], 0)).unwrap();
        let hits = idx.query("ñandú", 0, &[]).unwrap();
        assert_eq!(hits[0].excerpt.chars().count(), DEFAULT_EXCERPT_RUNES);
    }

    #[test]
    fn reopen_keeps_documents() {
        let tmp = TempDir::new().unwrap();
        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        idx.index_note(&note("keep", "durable content", &["x"], 0)).unwrap();
        Box::new(idx).close().unwrap();

        let idx = FullTextIndex::open(tmp.path()).unwrap();
        let hits = idx.query("durable", 0, &strings(&["x"])).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note_id, "keep");
    }

    #[test]
    fn empty_id_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut idx = FullTextIndex::open(tmp.path()).unwrap();
        assert!(matches!(
            idx.index_note(&note("", "x", &[], 0)),
            Err(IndexError::Config(_))
        ));
        assert!(idx.query("", 0, &[]).unwrap().is_empty());
    }
}
