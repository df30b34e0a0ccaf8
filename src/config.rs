//! Runtime configuration
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! binary before this runs) and may be overridden by command line flags.

use crate::error::{InsightsError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "employee_kpi.db";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct InsightsConfig {
    /// SQLite file produced by the dataset bootstrap
    pub db_path: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub busy_timeout_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl InsightsConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            db_path: non_empty("INSIGHTS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            api_key: non_empty("OPENAI_API_KEY"),
            model: non_empty("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            busy_timeout_ms: parse_u64("INSIGHTS_BUSY_TIMEOUT_MS", non_empty("INSIGHTS_BUSY_TIMEOUT_MS"))?
                .unwrap_or(defaults.busy_timeout_ms),
            request_timeout_secs: parse_u64(
                "INSIGHTS_REQUEST_TIMEOUT_SECS",
                non_empty("INSIGHTS_REQUEST_TIMEOUT_SECS"),
            )?
            .unwrap_or(defaults.request_timeout_secs),
        })
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The credential is only needed once a question reaches the oracle.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            InsightsError::Config("OPENAI_API_KEY is not set (use --api-key or the environment)".to_string())
        })
    }
}

fn parse_u64(key: &str, value: Option<String>) -> Result<Option<u64>> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|e| InsightsError::Config(format!("{} must be a non-negative integer, got '{}': {}", key, v, e)))
        })
        .transpose()
}
