use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    /// Full Bot API base, token included
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub bot_token: String,
}

impl TelegramConfig {
    /// Returns the Bot API base URL: `api_url` if set, otherwise one built
    /// from `bot_token`. Never ends with a slash.
    pub fn effective_api_url(&self) -> Option<String> {
        let url = if !self.api_url.is_empty() {
            self.api_url.clone()
        } else if !self.bot_token.is_empty() {
            format!("{}/bot{}", TELEGRAM_API_BASE, self.bot_token)
        } else {
            return None;
        };
        Some(url.trim_end_matches('/').to_string())
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    /// Read `path` (if it exists), apply environment overrides and resolve
    /// the Bot API URL. On success `telegram.api_url` is always set.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)?
        } else {
            warn!(
                "Config file {} not found, using defaults and environment",
                path.display()
            );
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.resolve()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// `TELEGRAM_API_URL`, `TELEGRAM_BOT_TOKEN` and `BIND_ADDRESS` take
    /// precedence over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = get("TELEGRAM_API_URL") {
            self.telegram.api_url = url;
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(addr) = get("BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
    }

    /// Replace `telegram.api_url` with the effective URL, failing when
    /// neither a URL nor a token is configured.
    pub fn resolve(&mut self) -> Result<()> {
        self.telegram.api_url = self.telegram.effective_api_url().context(
            "Telegram API is not configured: set [telegram] api_url or bot_token, \
             or the TELEGRAM_API_URL / TELEGRAM_BOT_TOKEN environment variables",
        )?;
        Ok(())
    }
}
