//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.linehook/config.json`) and environment.
//! Channel credentials are normally supplied through the environment so the file can be
//! committed without secrets.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE channel credentials and API endpoint.
    #[serde(default)]
    pub line: LineConfig,

    /// Keywords that select the canned replies.
    #[serde(default)]
    pub replies: RepliesConfig,
}

/// Server bind, port, route and acknowledgment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 3000).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,

    /// Route that receives LINE webhook POSTs (default "/webhook").
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// When the acknowledgment is sent relative to the reply calls.
    #[serde(default)]
    pub ack_mode: AckMode,
}

/// Whether the webhook response waits for the reply calls it triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckMode {
    /// Await every reply call; respond 500 if any of them failed.
    #[default]
    Await,

    /// Spawn the reply calls and respond 200 at once. Failures are only logged.
    Immediate,
}

fn default_server_port() -> u16 {
    3000
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
            webhook_path: default_webhook_path(),
            ack_mode: AckMode::default(),
        }
    }
}

/// LINE Messaging API channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel secret used to verify `x-line-signature`. Overridden by MSG_CHANNEL_SECRET env.
    pub channel_secret: Option<String>,
    /// Long-lived channel access token for the reply API. Overridden by MSG_CHANNEL_ACCESS_TOKEN env.
    pub channel_access_token: Option<String>,
    /// API base URL (default https://api.line.me). Overridden by LINE_API_BASE_URL env.
    pub api_base_url: Option<String>,
}

/// Keywords matched against incoming text messages (exact, case-sensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesConfig {
    /// Text that triggers the training prompt with Yes/No quick replies.
    #[serde(default = "default_training_keyword")]
    pub training_keyword: String,
    /// Text that triggers the point balance reply.
    #[serde(default = "default_point_keyword")]
    pub point_keyword: String,
    /// Text that triggers the product carousel. Unset means the carousel is never sent.
    #[serde(default)]
    pub carousel_keyword: Option<String>,
}

fn default_training_keyword() -> String {
    "traning".to_string()
}

fn default_point_keyword() -> String {
    "point".to_string()
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            training_keyword: default_training_keyword(),
            point_keyword: default_point_keyword(),
            carousel_keyword: None,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the channel secret: env MSG_CHANNEL_SECRET overrides config.
pub fn resolve_channel_secret(config: &Config) -> Option<String> {
    non_empty_env("MSG_CHANNEL_SECRET").or_else(|| non_empty(config.line.channel_secret.as_ref()))
}

/// Resolve the channel access token: env MSG_CHANNEL_ACCESS_TOKEN overrides config.
pub fn resolve_channel_access_token(config: &Config) -> Option<String> {
    non_empty_env("MSG_CHANNEL_ACCESS_TOKEN")
        .or_else(|| non_empty(config.line.channel_access_token.as_ref()))
}

/// Resolve the reply API base URL: env LINE_API_BASE_URL, then config, then the public endpoint.
pub fn resolve_api_base_url(config: &Config) -> String {
    non_empty_env("LINE_API_BASE_URL")
        .or_else(|| non_empty(config.line.api_base_url.as_ref()))
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_LINE_API_BASE_URL.to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("LINEHOOK_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".linehook").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default path). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
