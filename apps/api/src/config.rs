use std::time::Duration;

use anyhow::{Context, Result};

use crate::workflow_client::WorkflowKeys;

const DEFAULT_WORKFLOW_API_URL: &str = "https://api.dify.ai/v1";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub workflow_api_url: String,
    pub workflow_keys: WorkflowKeys,
    pub workflow_timeout: Duration,
    /// Deadline for a whole reasons backfill sweep.
    pub backfill_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            workflow_api_url: std::env::var("WORKFLOW_API_URL")
                .unwrap_or_else(|_| DEFAULT_WORKFLOW_API_URL.to_string()),
            workflow_keys: WorkflowKeys {
                summary: require_env("SUMMARY_WORKFLOW_KEY")?,
                college_list: require_env("COLLEGE_LIST_WORKFLOW_KEY")?,
                why_reasons: require_env("WHY_WORKFLOW_KEY")?,
                strategies: require_env("STRATEGY_WORKFLOW_KEY")?,
            },
            workflow_timeout: Duration::from_secs(env_or("WORKFLOW_TIMEOUT_SECS", 120)?),
            backfill_timeout: Duration::from_secs(env_or("BACKFILL_TIMEOUT_SECS", 600)?),
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
