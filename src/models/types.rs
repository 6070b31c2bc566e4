//! Core model types.
//!
//! This module provides:
//! - `ModelError` - Errors raised while connecting to or calling a model
//! - `PuzzleModel` - A callable model handle
//! - `ModelProvider` - Builds handles from model identifiers

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::puzzles::{ExtractError, ValidationError};

/// Errors that can occur while producing a puzzle from a model.
///
/// The rendered message is what the retry controller classifies, so upstream
/// statuses are always rendered as `status: <code>`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upstream error: status: {status}, body: {body}")]
    Status { status: u16, body: String },
    #[error("Model not found: {0}")]
    NotFound(String),
    #[error("Model {0} is unsupported for content generation")]
    Unsupported(String),
    #[error("Structured output is not available for {0}")]
    StructuredOutputUnavailable(String),
    #[error("Invalid model identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("Unreadable response: {0}")]
    Extract(#[from] ExtractError),
    #[error("Invalid puzzle: {0}")]
    Validation(#[from] ValidationError),
}

/// A model handle bound to one identifier and one output mode.
#[async_trait]
pub trait PuzzleModel: Send + Sync {
    /// Identifier the handle was built from.
    fn identifier(&self) -> &str;

    /// Whether replies are constrained by the response schema.
    fn is_structured(&self) -> bool;

    /// Send one user prompt and return the provider's raw response body.
    async fn generate(&self, prompt: &str) -> Result<Value, ModelError>;
}

/// Builds model handles.
///
/// `response_schema` selects structured-output mode when present.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn connect(
        &self,
        identifier: &str,
        system_instruction: &str,
        response_schema: Option<&Value>,
    ) -> Result<Box<dyn PuzzleModel>, ModelError>;
}
