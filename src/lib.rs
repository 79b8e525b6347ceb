//! # ora-notes
//!
//! A personal note-capture tool. Notes are appended to daily JSONL files
//! and indexed for keyword/tag retrieval; retrieved excerpts can be handed
//! to a local LLM as answer context.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ NoteStore  │──▶│  Box<dyn Index>  │──▶│  Snippets    │
//! │ JSONL/day  │   │ memory | FTS5    │   │ search / ask │
//! └────────────┘   └──────────────────┘   └──────┬───────┘
//!                                                ▼
//!                                         ┌──────────────┐
//!                                         │ Ollama chat  │
//!                                         └──────────────┘
//! ```
//!
//! The note model, tags, excerpts, the [`Index`](ora_notes_core::Index)
//! contract and the in-memory backend live in `ora-notes-core`. This crate
//! adds the durable SQLite FTS5 backend, the backend factory, and
//! everything the `ora` binary needs.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`store`] | JSONL note persistence |
//! | [`sqlite_index`] | SQLite FTS5 index backend |
//! | [`index`] | Backend factory (`open_or_create`) |
//! | [`llm`] | Chat-model trait and Ollama client |
//! | [`prompt`] | Ask-template loading |
//! | [`add`] | `ora add` |
//! | [`search`] | `ora search` |
//! | [`ask`] | `ora ask` pipeline |
//! | [`reindex`] | `ora reindex` |
//! | [`diag`] | `ora diag` environment checks |
//! | [`progress`] | Reindex progress on stderr |

pub mod add;
pub mod ask;
pub mod config;
pub mod diag;
pub mod index;
pub mod llm;
pub mod progress;
pub mod prompt;
pub mod reindex;
pub mod search;
pub mod sqlite_index;
pub mod store;

pub use index::open_or_create;
pub use ora_notes_core::{Index, IndexError, IndexResult, MemoryIndex, Note, Snippet};
pub use sqlite_index::FullTextIndex;
