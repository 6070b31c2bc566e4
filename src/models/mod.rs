//! Model access.
//!
//! This module handles:
//! - The `ModelProvider` / `PuzzleModel` seam the generator talks to
//! - Handle construction with identifier and output-mode fallbacks
//! - The Gemini REST provider

pub mod gemini;
mod model_factory;
mod types;

pub use gemini::{GeminiProvider, DEFAULT_API_BASE};
pub use model_factory::{connect_candidate, identifier_variants, MODEL_NAMESPACE};
pub use types::{ModelError, ModelProvider, PuzzleModel};
