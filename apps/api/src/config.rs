use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const WEBHOOK_ENV_PREFIX: &str = "WEBHOOK_URL_";

/// Application configuration loaded from environment variables.
///
/// Nothing here is required: a missing API key or webhook URL only fails the
/// request that needs it, so the dashboard stays usable for everything else.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    /// Keyed by lower-cased client id, e.g. `WEBHOOK_URL_CALL_LADE` → `call_lade`.
    pub webhook_urls: HashMap<String, String>,
    pub clients_config_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_api_url: optional_env("ANTHROPIC_API_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_API_URL.to_string()),
            webhook_urls: webhook_urls_from(std::env::vars()),
            clients_config_path: optional_env("CLIENTS_CONFIG_PATH").map(PathBuf::from),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn webhook_url(&self, client_id: &str) -> Option<&str> {
        self.webhook_urls
            .get(&client_id.to_lowercase())
            .map(String::as_str)
    }
}

/// Empty values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn webhook_urls_from(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter_map(|(key, value)| {
        let client = key.strip_prefix(WEBHOOK_ENV_PREFIX)?;
        let value = value.trim();
        if client.is_empty() || value.is_empty() {
            return None;
        }
        Some((client.to_lowercase(), value.to_string()))
    })
    .collect()
}

#[cfg(test)]
impl Config {
    /// Config for handler tests: no key, no webhooks, an unroutable LLM URL.
    pub fn for_tests() -> Self {
        Config {
            anthropic_api_key: None,
            anthropic_api_url: "http://127.0.0.1:9/v1/messages".to_string(),
            webhook_urls: HashMap::new(),
            clients_config_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
