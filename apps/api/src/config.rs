use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::listing::DEFAULT_ITEMS_PER_PAGE;
use crate::visitors::DEFAULT_MAX_VISITORS;

/// Upstream page size cap; the listing API rejects larger limits.
const DEFAULT_UPSTREAM_PAGE_LIMIT: usize = 100;
const DEFAULT_JOBS_CACHE_TTL_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream listing API, e.g. `http://localhost:5000/api`.
    pub jobs_api_url: String,
    /// When set, jobs are read from this JSON file instead of the upstream.
    pub jobs_file: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
    pub items_per_page: usize,
    pub upstream_page_limit: usize,
    /// How long a fetched job collection is reused. Zero disables caching.
    pub jobs_cache_ttl_secs: u64,
    pub max_visitors: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            jobs_api_url: std::env::var("JOBS_API_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            jobs_file: std::env::var("JOBS_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            items_per_page: positive(
                parse_env("ITEMS_PER_PAGE", DEFAULT_ITEMS_PER_PAGE)?,
                "ITEMS_PER_PAGE",
            )?,
            upstream_page_limit: positive(
                parse_env("UPSTREAM_PAGE_LIMIT", DEFAULT_UPSTREAM_PAGE_LIMIT)?,
                "UPSTREAM_PAGE_LIMIT",
            )?,
            jobs_cache_ttl_secs: parse_env("JOBS_CACHE_TTL_SECS", DEFAULT_JOBS_CACHE_TTL_SECS)?,
            max_visitors: positive(
                parse_env("MAX_VISITORS", DEFAULT_MAX_VISITORS)?,
                "MAX_VISITORS",
            )?,
        })
    }
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
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn positive(value: usize, key: &str) -> Result<usize> {
    anyhow::ensure!(value > 0, "{key} must be greater than zero");
    Ok(value)
}

#[cfg(test)]
impl Config {
    /// Defaults without touching the process environment.
    pub fn for_tests() -> Self {
        Config {
            jobs_api_url: "http://localhost:5000/api".to_string(),
            jobs_file: None,
            port: 8080,
            rust_log: "debug".to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            upstream_page_limit: DEFAULT_UPSTREAM_PAGE_LIMIT,
            jobs_cache_ttl_secs: 0,
            max_visitors: DEFAULT_MAX_VISITORS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: usize = parse_env("LISTINGS_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(positive(0, "ITEMS_PER_PAGE").is_err());
        assert_eq!(positive(12, "ITEMS_PER_PAGE").unwrap(), 12);
    }
}
