//! Configuration management.

mod settings;

pub use settings::{
    api_key_from_env, model_candidates, resolve_api_key, ConfigError, GeneratorConfig,
    API_BASE_ENV, API_KEY_ENV, DEFAULT_FALLBACK_MODEL, DEFAULT_MODEL, DEFAULT_OUTPUT,
    DEFAULT_TIMEOUT_SECS, FALLBACK_MODEL_ENV, MODEL_ENV, OUTPUT_ENV,
};
