//! Chat-completion client.
//!
//! The [`ChatModel`] trait is the seam the ask pipeline talks to.
//! [`OllamaClient`] implements it against a local Ollama server's
//! `/api/chat` endpoint using a blocking HTTP client.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Sampling and runtime knobs for a single chat call.
///
/// Zero or unset values are left out of the request so the server
/// applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub num_ctx: u32,
    pub num_predict: u32,
    pub keep_alive: Option<String>,
}

impl ChatOptions {
    pub fn from_config(cfg: &LlmConfig) -> Self {
        Self {
            model: cfg.model.clone(),
            temperature: cfg.temperature.unwrap_or(0.0),
            top_p: cfg.top_p.unwrap_or(0.0),
            num_ctx: cfg.num_ctx.unwrap_or(0),
            num_predict: cfg.num_predict.unwrap_or(0),
            keep_alive: cfg.keep_alive.clone().filter(|k| !k.trim().is_empty()),
        }
    }

    /// The `options` object, holding only non-zero values.
    fn options_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        if self.temperature != 0.0 {
            map.insert("temperature".into(), self.temperature.into());
        }
        if self.top_p != 0.0 {
            map.insert("top_p".into(), self.top_p.into());
        }
        if self.num_ctx != 0 {
            map.insert("num_ctx".into(), self.num_ctx.into());
        }
        if self.num_predict != 0 {
            map.insert("num_predict".into(), self.num_predict.into());
        }
        map
    }
}

/// Anything that can answer a system + user prompt pair.
pub trait ChatModel {
    fn chat(&self, system: &str, user: &str, opts: &ChatOptions) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    options: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

fn build_request<'a>(system: &'a str, user: &'a str, opts: &'a ChatOptions) -> ChatRequest<'a> {
    ChatRequest {
        model: &opts.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
        stream: false,
        options: opts.options_map(),
        keep_alive: opts.keep_alive.as_deref(),
    }
}

fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    let resp: ChatResponse =
        serde_json::from_value(json.clone()).context("Invalid Ollama chat response")?;
    resp.message
        .map(|m| m.content)
        .ok_or_else(|| anyhow!("Invalid Ollama chat response: missing 'message'"))
}

/// Blocking client for a local Ollama server.
pub struct OllamaClient {
    host: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(host: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        Self::new(&cfg.host, Duration::from_secs(cfg.timeout_secs))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check that the server answers `GET /api/tags`.
    pub fn ping(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.host);
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Ollama connection error (is Ollama running at {}?)", self.host))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("Ollama API error {}", status);
        }
        Ok(())
    }
}

impl ChatModel for OllamaClient {
    fn chat(&self, system: &str, user: &str, opts: &ChatOptions) -> Result<String> {
        let url = format!("{}/api/chat", self.host);
        let body = build_request(system, user, opts);
        tracing::debug!(model = %opts.model, url = %url, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("Ollama connection error (is Ollama running at {}?)", self.host))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            bail!("Ollama API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().context("Invalid Ollama chat response")?;
        parse_chat_response(&json)
    }
}
