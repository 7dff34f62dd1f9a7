use std::time::Duration;

use anyhow::{Context, Result};

/// Default remote model used when `EMOTION_MODEL` is not set.
pub const DEFAULT_EMOTION_MODEL: &str = "claude-sonnet-4-5";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub emotion: EmotionConfig,
}

/// Analysis engine settings. Fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct EmotionConfig {
    /// `None` selects the offline lexicon strategy.
    pub api_key: Option<String>,
    pub model: String,
    pub max_retries: u32,
    pub attempt_timeout: Duration,
    pub backoff_base: Duration,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_EMOTION_MODEL.to_string(),
            max_retries: 2,
            attempt_timeout: Duration::from_millis(15_000),
            backoff_base: Duration::from_millis(1_000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = EmotionConfig::default();
        let emotion = EmotionConfig {
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model: std::env::var("EMOTION_MODEL").unwrap_or(defaults.model),
            max_retries: parse_env("EMOTION_MAX_RETRIES", defaults.max_retries)?,
            attempt_timeout: Duration::from_millis(parse_env("EMOTION_TIMEOUT_MS", 15_000u64)?),
            backoff_base: Duration::from_millis(parse_env("EMOTION_BACKOFF_MS", 1_000u64)?),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            emotion,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
