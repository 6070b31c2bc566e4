//! Model handle construction with identifier and output-mode fallbacks.
//!
//! Provides `connect_candidate()` which turns one model candidate into a
//! callable handle.
//!
//! # Construction Order
//! 1. The identifier as given, structured output (JSON schema)
//! 2. The identifier as given, unconstrained output
//! 3. The alternate identifier form (bare <-> `models/` namespaced), structured
//! 4. The alternate identifier form, unconstrained

use tracing::{debug, info, warn};

use crate::generator::{ErrorClass, ErrorClassifier};
use crate::puzzles::{response_schema, SYSTEM_INSTRUCTION};

use super::types::{ModelError, ModelProvider, PuzzleModel};

/// Namespace prefix some endpoints expect on model identifiers.
pub const MODEL_NAMESPACE: &str = "models/";

/// Identifier forms to try, the given form first.
pub fn identifier_variants(identifier: &str) -> Vec<String> {
    let id = identifier.trim();
    let alternate = match id.strip_prefix(MODEL_NAMESPACE) {
        Some(bare) => bare.to_string(),
        None => format!("{MODEL_NAMESPACE}{id}"),
    };

    let mut variants = vec![id.to_string()];
    if !alternate.is_empty() && alternate != id {
        variants.push(alternate);
    }
    variants
}

/// Build a handle for `candidate`.
///
/// Every identifier form and output mode is tried in order and the first
/// success wins. A quota error stops the search at once since every further
/// request would hit the same limit. Otherwise the last error is returned.
pub async fn connect_candidate<P>(
    provider: &P,
    candidate: &str,
    classifier: &dyn ErrorClassifier,
) -> Result<Box<dyn PuzzleModel>, ModelError>
where
    P: ModelProvider + ?Sized,
{
    let schema = response_schema();
    let mut last_error = None;

    for identifier in identifier_variants(candidate) {
        for structured in [true, false] {
            let mode_schema = structured.then_some(&schema);
            match provider
                .connect(&identifier, SYSTEM_INSTRUCTION, mode_schema)
                .await
            {
                Ok(model) => {
                    info!(
                        candidate = %candidate,
                        identifier = %identifier,
                        structured = structured,
                        "Model handle constructed"
                    );
                    return Ok(model);
                }
                Err(e) => {
                    let class = classifier.classify(&e.to_string());
                    debug!(
                        identifier = %identifier,
                        structured = structured,
                        class = ?class,
                        error = %e,
                        "Model construction failed"
                    );
                    if class == ErrorClass::Quota {
                        return Err(e);
                    }
                    last_error = Some(e);
                }
            }
        }
    }

    let err = last_error.unwrap_or_else(|| ModelError::InvalidIdentifier(candidate.to_string()));
    warn!(candidate = %candidate, error = %err, "No usable handle for model candidate");
    Err(err)
}
