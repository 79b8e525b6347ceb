//! Engine-level tests that run the same checks against both backends
//! through the factory.

use chrono::{TimeZone, Utc};
use ora_notes::{open_or_create, Index, IndexError, Note};
use tempfile::TempDir;

fn note(id: &str, content: &str, tags: &[&str], minute: u32) -> Note {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 9, minute, 0).unwrap();
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

fn ids(index: &dyn Index, text: &str, top_k: i64, tags: &[&str]) -> Vec<String> {
    let mut ids: Vec<String> = index
        .query(text, top_k, &strings(tags))
        .unwrap()
        .into_iter()
        .map(|s| s.note_id)
        .collect();
    ids.sort();
    ids
}

/// Both backends: an empty path and a fresh directory.
fn each_backend(check: impl Fn(Box<dyn Index>)) {
    check(open_or_create("").unwrap());
    let tmp = TempDir::new().unwrap();
    check(open_or_create(tmp.path().join("index")).unwrap());
}

fn seed(index: &mut dyn Index) {
    index.index_note(&note("a1", "alpha release checklist", &["dev"], 1)).unwrap();
    index.index_note(&note("a2", "alpha test harness", &["test", "dev"], 2)).unwrap();
    index.index_note(&note("a3", "grocery list", &["life"], 3)).unwrap();
}

// ─── Contract, run against both backends ────────────────────────────

#[test]
fn scenario_holds_on_both_backends() {
    each_backend(|mut index| {
        seed(index.as_mut());

        let hits = index.query("alpha", 1, &strings(&["dev"])).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(["a1", "a2"].contains(&hits[0].note_id.as_str()));

        assert!(index.query("nope", 5, &[]).unwrap().is_empty());
        index.close().unwrap();
    });
}

#[test]
fn backends_agree_on_hit_sets() {
    each_backend(|mut index| {
        seed(index.as_mut());
        assert_eq!(ids(index.as_ref(), "alpha", 0, &[]), vec!["a1", "a2"]);
        assert_eq!(ids(index.as_ref(), "alpha harness", 0, &[]), vec!["a2"]);
        assert_eq!(ids(index.as_ref(), "", 0, &["DEV", "test"]), vec!["a2"]);
        assert_eq!(ids(index.as_ref(), "", 0, &[]), vec!["a1", "a2", "a3"]);
        assert_eq!(ids(index.as_ref(), "", -3, &["life"]), vec!["a3"]);
        assert!(ids(index.as_ref(), "alpha", 0, &["life"]).is_empty());
        index.close().unwrap();
    });
}

#[test]
fn upsert_is_idempotent_on_both_backends() {
    each_backend(|mut index| {
        let n = note("same", "version one", &["x"], 0);
        index.index_note(&n).unwrap();
        index.index_note(&n).unwrap();
        assert_eq!(index.query("", 0, &[]).unwrap().len(), 1);

        index.index_note(&note("same", "version two", &["y"], 0)).unwrap();
        assert!(index.query("one", 0, &[]).unwrap().is_empty());
        assert!(index.query("", 0, &strings(&["x"])).unwrap().is_empty());
        assert_eq!(ids(index.as_ref(), "two", 0, &["y"]), vec!["same"]);
        index.close().unwrap();
    });
}

#[test]
fn top_k_bounds_results() {
    each_backend(|mut index| {
        for i in 0..10 {
            index
                .index_note(&note(&format!("n{i}"), "shared words here", &[], i))
                .unwrap();
        }
        assert_eq!(index.query("shared", 4, &[]).unwrap().len(), 4);
        assert_eq!(index.query("shared", 0, &[]).unwrap().len(), 10);
        assert_eq!(index.query("shared", 50, &[]).unwrap().len(), 10);
        index.close().unwrap();
    });
}

#[test]
fn excerpts_are_rune_safe() {
    each_backend(|mut index| {
        let content = "café ☕ ".repeat(60);
        index.index_note(&note("m", &content, &[], 0)).unwrap();
        let hits = index.query("café", 0, &[]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].excerpt.chars().count(), 160);
        assert!(content.trim().starts_with(&hits[0].excerpt));
        index.close().unwrap();
    });
}

#[test]
fn symbol_words_narrow_results_on_both_backends() {
    each_backend(|mut index| {
        index.index_note(&note("plain", "alpha notes", &[], 1)).unwrap();
        index.index_note(&note("dash", "alpha - 🦀 notes", &[], 2)).unwrap();
        assert_eq!(ids(index.as_ref(), "alpha 🦀", 0, &[]), vec!["dash"]);
        assert_eq!(ids(index.as_ref(), "alpha -", 0, &[]), vec!["dash"]);
        assert_eq!(ids(index.as_ref(), "🦀", 0, &[]), vec!["dash"]);
        assert!(ids(index.as_ref(), "alpha 🦀", 0, &["missing"]).is_empty());
        index.close().unwrap();
    });
}

#[test]
fn empty_id_is_a_config_error() {
    each_backend(|mut index| {
        let err = index.index_note(&note("", "x", &[], 0)).unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));
        index.close().unwrap();
    });
}

// ─── Lifecycle ──────────────────────────────────────────────────────

#[test]
fn durable_index_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("deep").join("index");

    let mut index = open_or_create(&root).unwrap();
    seed(index.as_mut());
    index.close().unwrap();

    let index = open_or_create(&root).unwrap();
    assert_eq!(ids(index.as_ref(), "alpha", 0, &["dev"]), vec!["a1", "a2"]);
    index.close().unwrap();
}

#[test]
fn durable_index_survives_drop_without_close() {
    let tmp = TempDir::new().unwrap();
    {
        let mut index = open_or_create(tmp.path()).unwrap();
        index.index_note(&note("d", "dropped not closed", &[], 0)).unwrap();
    }
    let index = open_or_create(tmp.path()).unwrap();
    assert_eq!(ids(index.as_ref(), "dropped", 0, &[]), vec!["d"]);
    index.close().unwrap();
}

#[test]
fn in_memory_indexes_are_isolated() {
    let mut first = open_or_create("").unwrap();
    seed(first.as_mut());
    let second = open_or_create("").unwrap();
    assert!(second.query("", 0, &[]).unwrap().is_empty());
    first.close().unwrap();
    second.close().unwrap();
}

#[test]
fn unusable_path_fails_with_path_in_error() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("occupied");
    std::fs::write(&file, "not a directory").unwrap();
    let err = match open_or_create(file.join("index")) {
        Err(e) => e,
        Ok(_) => panic!("expected open to fail"),
    };
    assert!(matches!(err, IndexError::Io { .. }));
    assert!(err.to_string().contains("occupied"));
}
