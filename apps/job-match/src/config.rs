use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_STORE_PATH: &str = ".job-match/analysis.json";
/// Same order of magnitude as browser local storage.
const DEFAULT_STORE_QUOTA_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_MOCK_DELAY_MS: u64 = 2000;

/// Application configuration loaded from environment variables.
/// Every setting has a default; only malformed values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub match_api_base_url: String,
    pub match_api_key: Option<String>,
    pub store_path: PathBuf,
    pub store_quota_bytes: usize,
    pub port: u16,
    pub mock_delay: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            match_api_base_url: optional_env("MATCH_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            match_api_key: optional_env("MATCH_API_KEY"),
            store_path: optional_env("JOB_MATCH_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            store_quota_bytes: parse_env("JOB_MATCH_STORE_QUOTA_BYTES", DEFAULT_STORE_QUOTA_BYTES)?,
            port: parse_env("PORT", 3000)?,
            mock_delay: Duration::from_millis(parse_env("MOCK_DELAY_MS", DEFAULT_MOCK_DELAY_MS)?),
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("JOB_MATCH_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(value, 3000);
    }

    #[test]
    fn test_parse_env_reports_key_on_bad_value() {
        std::env::set_var("JOB_MATCH_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("JOB_MATCH_TEST_BAD_PORT", 3000).unwrap_err();
        assert!(err.to_string().contains("JOB_MATCH_TEST_BAD_PORT"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        std::env::set_var("JOB_MATCH_TEST_BLANK_KEY", "   ");
        assert_eq!(optional_env("JOB_MATCH_TEST_BLANK_KEY"), None);
    }
}
