use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[llm].host`.
pub const HOST_ENV: &str = "OLLAMA_HOST";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub num_ctx: Option<u32>,
    #[serde(default)]
    pub num_predict: Option<u32>,
    /// Passed through verbatim, e.g. `"30s"` or `"5m"`.
    #[serde(default)]
    pub keep_alive: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
            top_p: None,
            num_ctx: None,
            num_predict: None,
            keep_alive: None,
        }
    }
}

fn default_host() -> String {
    "http://127.0.0.1:11434".to_string()
}
fn default_model() -> String {
    "llama3".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,
    /// Index root. An empty path selects the in-memory backend.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            index_path: default_index_path(),
        }
    }
}

fn default_notes_dir() -> PathBuf {
    PathBuf::from("data/notes")
}
fn default_index_path() -> PathBuf {
    PathBuf::from("data/index")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    #[serde(default = "default_rebuild_on_start")]
    pub rebuild_on_start: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            rebuild_on_start: default_rebuild_on_start(),
        }
    }
}

fn default_top_k() -> i64 {
    20
}
fn default_rebuild_on_start() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PromptConfig {
    #[serde(default)]
    pub template: Option<PathBuf>,
}

/// Load the TOML config at `path`.
///
/// A missing file yields the built-in defaults. A file that exists but
/// does not parse, or fails validation, is an error. Keys present in the
/// file override the defaults one field at a time.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.as_os_str().is_empty() || !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found; using defaults");
        Config::default()
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    };

    if let Ok(host) = std::env::var(HOST_ENV) {
        if !host.trim().is_empty() {
            config.llm.host = host.trim().to_string();
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(config.llm.host.starts_with("http://") || config.llm.host.starts_with("https://")) {
        bail!(
            "llm.host must start with http:// or https:// (got '{}')",
            config.llm.host
        );
    }
    if config.llm.model.trim().is_empty() {
        bail!("llm.model must not be empty");
    }
    if config.llm.timeout_secs == 0 {
        bail!("llm.timeout_secs must be > 0");
    }
    Ok(())
}
