//! # ora-notes core
//!
//! Shared logic for ora-notes: the note model, tag handling, rune-safe
//! excerpts, the [`Index`](index::Index) contract with its in-memory
//! backend, and prompt context assembly.
//!
//! This crate contains no SQLite, HTTP, or filesystem dependencies. The
//! durable full-text backend and the backend factory live in the
//! `ora-notes` app crate.

pub mod error;
pub mod excerpt;
pub mod index;
pub mod models;
pub mod prompt;
pub mod tags;

pub use error::{IndexError, IndexResult};
pub use index::{Index, MemoryIndex};
pub use models::{Note, Snippet};
