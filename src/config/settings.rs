//! Run settings resolved from the environment and command line.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::generator::RetryPolicy;
use crate::models::DEFAULT_API_BASE;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the primary model.
pub const MODEL_ENV: &str = "GEMINI_MODEL";
/// Environment variable overriding the fallback model.
pub const FALLBACK_MODEL_ENV: &str = "GEMINI_FALLBACK_MODEL";
/// Environment variable overriding the API endpoint.
pub const API_BASE_ENV: &str = "GEMINI_API_BASE";
/// Environment variable overriding the output path.
pub const OUTPUT_ENV: &str = "ODDBALL_OUTPUT";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OUTPUT: &str = "puzzles.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors that make a run impossible to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),
}

/// Read the API key from `GEMINI_API_KEY`.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    resolve_api_key(std::env::var(API_KEY_ENV).ok())
}

/// Accept a key only if it has non-whitespace content.
pub fn resolve_api_key(value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))
}

/// Ordered, de-duplicated model candidates.
///
/// Blank overrides fall back to the built-in defaults.
pub fn model_candidates(primary: Option<&str>, fallback: Option<&str>) -> Vec<String> {
    let mut candidates = vec![pick_model(primary, DEFAULT_MODEL)];
    let fallback = pick_model(fallback, DEFAULT_FALLBACK_MODEL);
    if !candidates.contains(&fallback) {
        candidates.push(fallback);
    }
    candidates
}

fn pick_model(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Everything a generation run needs.
#[derive(Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub candidates: Vec<String>,
    pub api_base: String,
    pub request_timeout: Duration,
    pub output_path: PathBuf,
    pub retry: RetryPolicy,
}

impl GeneratorConfig {
    /// Create a config with default endpoint, timeout, output path and
    /// retry policy.
    pub fn new(api_key: String, candidates: Vec<String>) -> Self {
        Self {
            api_key,
            candidates,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            retry: RetryPolicy::default(),
        }
    }
}

// Keep the key out of logs.
impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"<redacted>")
            .field("candidates", &self.candidates)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .field("output_path", &self.output_path)
            .field("retry", &self.retry)
            .finish()
    }
}
