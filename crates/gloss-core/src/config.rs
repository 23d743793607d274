//! Run configuration
//!
//! Resolved once at process start and passed explicitly into each component.

use crate::error::ConfigError;
use crate::types::SourceColumn;
use std::fmt;

/// Store connection string variable
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Service credential variable
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Optional service base URL variable
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Default service base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Model used for every request
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Sampling temperature for every request
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Response length cap, in tokens
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Maximum rows selected per run
pub const DEFAULT_BATCH_LIMIT: u32 = 300;

/// Per-run settings consumed by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Column the source text is read from
    pub source_column: SourceColumn,
    /// Maximum rows selected
    pub batch_limit: u32,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Response length cap
    pub max_tokens: u32,
}

impl RunSettings {
    /// Create default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With source column
    #[inline]
    #[must_use]
    pub fn with_source_column(mut self, column: SourceColumn) -> Self {
        self.source_column = column;
        self
    }

    /// With batch limit
    #[inline]
    #[must_use]
    pub fn with_batch_limit(mut self, limit: u32) -> Self {
        self.batch_limit = limit;
        self
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            source_column: SourceColumn::default(),
            batch_limit: DEFAULT_BATCH_LIMIT,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Full process configuration
#[derive(Clone)]
pub struct EnricherConfig {
    /// Store connection string
    pub database_url: String,
    /// Service credential
    pub api_key: String,
    /// Service base URL, without trailing slash
    pub base_url: String,
    /// Orchestrator settings
    pub run: RunSettings,
}

impl EnricherConfig {
    /// Resolve from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let database_url = required(DATABASE_URL_VAR)?;
        let api_key = required(API_KEY_VAR)?;

        let base_url = match lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                let url = url.trim().trim_end_matches('/').to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidVar {
                        name: BASE_URL_VAR,
                        reason: format!("expected an http(s) URL, got {url:?}"),
                    });
                }
                url
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        Ok(Self {
            database_url,
            api_key,
            base_url,
            run: RunSettings::default(),
        })
    }

    /// With run settings
    #[inline]
    #[must_use]
    pub fn with_run(mut self, run: RunSettings) -> Self {
        self.run = run;
        self
    }
}

impl fmt::Debug for EnricherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnricherConfig")
            .field("database_url", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("run", &self.run)
            .finish()
    }
}
