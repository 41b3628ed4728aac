use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails fast at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Seconds between readiness poller attempts.
    pub poll_interval_secs: u64,
    /// Authoritative attempt ceiling for the readiness poller.
    pub poll_max_attempts: u32,
    /// Number of background question-synthesis workers.
    pub question_workers: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .context("POLL_INTERVAL_SECS must be a valid integer")?,
            poll_max_attempts: std::env::var("POLL_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u32>()
                .context("POLL_MAX_ATTEMPTS must be a valid integer")?,
            question_workers: std::env::var("QUESTION_WORKERS")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<usize>()
                .context("QUESTION_WORKERS must be a valid integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
