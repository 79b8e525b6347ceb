//! # ora CLI
//!
//! Capture short notes and pull them back by keyword or tag, optionally
//! asking a local LLM to answer from them.
//!
//! ## Usage
//!
//! ```bash
//! ora --config ./config/ora.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ora add <text>` | Save a note (tags from `--tags` and `#hashtags`) |
//! | `ora search <query>` | List matching notes with score and excerpt |
//! | `ora ask <question>` | Answer a question from matching notes |
//! | `ora reindex` | Rebuild the index from the note store |
//! | `ora diag` | Check LLM host, notes directory, and template |
//!
//! ## Examples
//!
//! ```bash
//! ora add "Rotate the API keys before Friday #ops" --tags work
//! ora search "api keys" --tags ops
//! ora ask "what do I need to do before Friday?" --topk 5
//! ora ask "keys" --no-llm
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ora_notes::add::add_note;
use ora_notes::ask::{run_ask, AskRequest};
use ora_notes::config::{self, Config};
use ora_notes::diag::run_diag;
use ora_notes::index::{open_and_rebuild, open_or_create};
use ora_notes::llm::{ChatOptions, OllamaClient};
use ora_notes::progress::ProgressMode;
use ora_notes::reindex::reindex;
use ora_notes::search::{run_search, SearchRequest};
use ora_notes::store::NoteStore;
use ora_notes_core::tags::parse_tag_list;

/// ora: a personal note-capture tool with keyword/tag retrieval.
///
/// Configuration is read from a TOML file; a missing file means built-in
/// defaults. See `config/ora.example.toml`.
#[derive(Parser)]
#[command(
    name = "ora",
    about = "Capture notes and retrieve them by keyword or tag, with optional LLM answers",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ora.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a new note.
    Add {
        /// Note text. Multiple words are joined with spaces.
        #[arg(required = true)]
        content: Vec<String>,

        /// Comma-separated tags, merged with #hashtags found in the text.
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Search notes by keyword and tag.
    ///
    /// Every word must appear in the note and every tag must be on it.
    Search {
        query: Vec<String>,

        /// Comma-separated tags (all required).
        #[arg(long, default_value = "")]
        tags: String,

        /// Maximum number of results (0 = unlimited). Defaults to `retrieval.top_k`.
        #[arg(long)]
        limit: Option<i64>,

        /// Center each excerpt on the first query word.
        #[arg(long)]
        centered: bool,
    },

    /// Answer a question using matching notes as context.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,

        /// Comma-separated tags (all required).
        #[arg(long, default_value = "")]
        tags: String,

        /// Number of snippets to retrieve. Defaults to `retrieval.top_k`.
        #[arg(long)]
        topk: Option<i64>,

        /// Print matching note IDs without calling the model.
        #[arg(long)]
        no_llm: bool,

        /// Model name. Defaults to `llm.model`.
        #[arg(long)]
        model: Option<String>,

        /// Prompt template file (TOML with `system` / `user`).
        #[arg(long)]
        template: Option<PathBuf>,

        /// LLM host. Defaults to `llm.host`.
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        temp: Option<f64>,

        #[arg(long)]
        top_p: Option<f64>,

        #[arg(long)]
        num_ctx: Option<u32>,

        #[arg(long)]
        num_predict: Option<u32>,

        /// How long the model stays loaded, e.g. `30s` or `5m`.
        #[arg(long)]
        keep_alive: Option<String>,
    },

    /// Rebuild the index from the note store.
    Reindex {
        /// Emit progress as JSON lines on stderr.
        #[arg(long)]
        json_progress: bool,
    },

    /// Check the LLM host, notes directory, and template.
    Diag {
        /// LLM host to probe. Defaults to `llm.host`.
        #[arg(long)]
        host: Option<String>,

        /// Template file to check. Defaults to `prompt.template`.
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Add { content, tags } => {
            let store = NoteStore::open(&cfg.data.notes_dir)?;
            let mut index = open_or_create(&cfg.data.index_path)
                .with_context(|| format!("open index {}", cfg.data.index_path.display()))?;
            let added = add_note(&store, index.as_mut(), &content.join(" "), &parse_tag_list(&tags));
            let closed = index.close().context("close index");
            let note = added?;
            closed?;
            println!("ID: {}", note.id);
        }
        Commands::Search {
            query,
            tags,
            limit,
            centered,
        } => {
            let (index, notes) = open_rebuilt(&cfg)?;
            let req = SearchRequest {
                query: query.join(" "),
                tags: parse_tag_list(&tags),
                limit: limit.unwrap_or(cfg.retrieval.top_k),
                centered,
            };
            let mut out = std::io::stdout().lock();
            let searched = run_search(index.as_ref(), &notes, &req, &mut out);
            let closed = index.close().context("close index");
            searched?;
            closed?;
        }
        Commands::Ask {
            question,
            tags,
            topk,
            no_llm,
            model,
            template,
            host,
            temp,
            top_p,
            num_ctx,
            num_predict,
            keep_alive,
        } => {
            let mut llm_cfg = cfg.llm.clone();
            if let Some(m) = model {
                llm_cfg.model = m;
            }
            if let Some(h) = host {
                llm_cfg.host = h;
            }
            llm_cfg.temperature = temp.or(llm_cfg.temperature);
            llm_cfg.top_p = top_p.or(llm_cfg.top_p);
            llm_cfg.num_ctx = num_ctx.or(llm_cfg.num_ctx);
            llm_cfg.num_predict = num_predict.or(llm_cfg.num_predict);
            llm_cfg.keep_alive = keep_alive.or(llm_cfg.keep_alive);

            let req = AskRequest {
                question: question.join(" "),
                tags: parse_tag_list(&tags),
                top_k: topk.unwrap_or(cfg.retrieval.top_k),
                no_llm,
                template: template.or_else(|| cfg.prompt.template.clone()),
                options: ChatOptions::from_config(&llm_cfg),
            };
            let client = OllamaClient::from_config(&llm_cfg)?;
            let (index, _) = open_rebuilt(&cfg)?;

            let mut out = std::io::stdout().lock();
            let mut err = std::io::stderr();
            run_ask(index, &req, &client, &mut out, &mut err)?;
            out.flush()?;
        }
        Commands::Reindex { json_progress } => {
            let store = NoteStore::open(&cfg.data.notes_dir)?;
            let mut index = open_or_create(&cfg.data.index_path)
                .with_context(|| format!("open index {}", cfg.data.index_path.display()))?;
            let progress = ProgressMode::select(json_progress).reporter();
            let indexed = reindex(&store, index.as_mut(), progress.as_ref());
            let closed = index.close().context("close index");
            let count = indexed?;
            closed?;
            println!("Indexed {} notes.", count);
        }
        Commands::Diag { host, template } => {
            let host = host.unwrap_or_else(|| cfg.llm.host.clone());
            let template = template.or_else(|| cfg.prompt.template.clone());
            let report = run_diag(
                || OllamaClient::new(&host, Duration::from_secs(5))?.ping(),
                &cfg.data.notes_dir,
                template.as_deref(),
            );
            println!("{}", report);
        }
    }

    Ok(())
}

/// Open the configured index, rebuilt from the note store when
/// `retrieval.rebuild_on_start` is set. Also returns the stored notes.
fn open_rebuilt(cfg: &Config) -> Result<(Box<dyn ora_notes_core::Index>, Vec<ora_notes_core::Note>)> {
    let notes = load_notes(&cfg.data.notes_dir)?;
    let index = open_and_rebuild(&cfg.data.index_path, &notes, cfg.retrieval.rebuild_on_start)
        .with_context(|| format!("open index {}", cfg.data.index_path.display()))?;
    Ok((index, notes))
}

fn load_notes(dir: &Path) -> Result<Vec<ora_notes_core::Note>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    NoteStore::open(dir)?.list()
}
