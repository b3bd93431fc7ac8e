//! Client configuration

use anyhow::Context;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root every endpoint path is appended to
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// How often list views re-fetch
    pub refresh_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            refresh_interval: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Reads `GRAMS_API_URL`, `GRAMS_API_TIMEOUT_SECS` and
    /// `GRAMS_REFRESH_INTERVAL_SECS`, after loading a `.env` file if present.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("GRAMS_API_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("GRAMS_API_TIMEOUT_SECS") {
            config.timeout = parse_secs(&secs).context("GRAMS_API_TIMEOUT_SECS")?;
        }
        if let Some(secs) = lookup("GRAMS_REFRESH_INTERVAL_SECS") {
            config.refresh_interval = parse_secs(&secs).context("GRAMS_REFRESH_INTERVAL_SECS")?;
        }

        Ok(config)
    }
}

fn parse_secs(raw: &str) -> anyhow::Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{raw}' is not a number of seconds"))?;
    anyhow::ensure!(secs > 0, "must be at least one second");
    Ok(Duration::from_secs(secs))
}
