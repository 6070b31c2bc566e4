//! Puzzle generation with retries and model fallback.
//!
//! `PuzzleGenerator` fills one slot per prompt. Each slot walks the model
//! candidates in order:
//! - quota errors abort the whole run
//! - not-found errors skip straight to the next candidate
//! - anything else is retried with exponential backoff, then the next
//!   candidate is tried

mod retry;

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::models::{connect_candidate, ModelError, ModelProvider, PuzzleModel};
use crate::puzzles::{
    extract_text, isolate_json, shuffle_puzzle, validate_puzzle, ExtractError, Puzzle,
};

pub use retry::{ErrorClass, ErrorClassifier, RetryPolicy, SignatureClassifier};

/// Lifecycle of a single puzzle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Generating,
    Success,
    SlotFailed,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Pending => write!(f, "pending"),
            SlotState::Generating => write!(f, "generating"),
            SlotState::Success => write!(f, "success"),
            SlotState::SlotFailed => write!(f, "slot_failed"),
        }
    }
}

/// Result of a whole generation run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every slot produced a puzzle.
    Complete(Vec<Puzzle>),
    /// Some slots failed for reasons other than quota.
    Incomplete {
        puzzles: Vec<Puzzle>,
        /// 1-based slot numbers.
        failed_slots: Vec<usize>,
    },
    /// A quota error stopped the run.
    QuotaExhausted {
        slot: usize,
        model: String,
        reason: String,
    },
}

impl RunOutcome {
    /// Puzzles to persist, present only when the batch is complete.
    pub fn complete_batch(&self) -> Option<&[Puzzle]> {
        match self {
            RunOutcome::Complete(puzzles) => Some(puzzles),
            _ => None,
        }
    }
}

enum SlotOutcome {
    Success(Puzzle),
    Failed,
}

struct QuotaStop {
    model: String,
    reason: String,
}

/// Drives model calls for a batch of prompts.
pub struct PuzzleGenerator<P> {
    provider: P,
    candidates: Vec<String>,
    policy: RetryPolicy,
    classifier: Box<dyn ErrorClassifier>,
    rng: StdRng,
}

impl<P: ModelProvider> PuzzleGenerator<P> {
    /// Create a generator with the default retry policy and classifier and an
    /// entropy-seeded shuffle.
    pub fn new(provider: P, candidates: Vec<String>) -> Self {
        Self {
            provider,
            candidates,
            policy: RetryPolicy::default(),
            classifier: Box::new(SignatureClassifier::default()),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_classifier(mut self, classifier: impl ErrorClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Replace the shuffle's random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generate one puzzle per prompt.
    pub async fn run(&mut self, prompts: &[&str]) -> RunOutcome {
        let mut puzzles = Vec::with_capacity(prompts.len());
        let mut failed_slots = Vec::new();

        for (index, prompt) in prompts.iter().enumerate() {
            let slot = index + 1;
            debug!(slot = slot, state = %SlotState::Pending, "Slot queued");

            match self.generate_slot(slot, prompt).await {
                Ok(SlotOutcome::Success(puzzle)) => {
                    info!(
                        slot = slot,
                        state = %SlotState::Success,
                        category = %puzzle.category,
                        "Puzzle generated"
                    );
                    puzzles.push(puzzle);
                }
                Ok(SlotOutcome::Failed) => {
                    warn!(
                        slot = slot,
                        state = %SlotState::SlotFailed,
                        "Every model candidate failed"
                    );
                    failed_slots.push(slot);
                }
                Err(QuotaStop { model, reason }) => {
                    error!(
                        slot = slot,
                        model = %model,
                        reason = %reason,
                        "Quota exhausted, aborting run"
                    );
                    return RunOutcome::QuotaExhausted {
                        slot,
                        model,
                        reason,
                    };
                }
            }
        }

        if failed_slots.is_empty() {
            RunOutcome::Complete(puzzles)
        } else {
            RunOutcome::Incomplete {
                puzzles,
                failed_slots,
            }
        }
    }

    async fn generate_slot(&mut self, slot: usize, prompt: &str) -> Result<SlotOutcome, QuotaStop> {
        debug!(slot = slot, state = %SlotState::Generating, "Slot started");
        let candidates = self.candidates.clone();

        for candidate in &candidates {
            let mut handle: Option<Box<dyn PuzzleModel>> = None;

            for attempt in 1..=self.policy.max_attempts {
                let err = match self.attempt(&mut handle, candidate, prompt).await {
                    Ok(puzzle) => return Ok(SlotOutcome::Success(puzzle)),
                    Err(e) => e,
                };

                let reason = err.to_string();
                match self.classifier.classify(&reason) {
                    ErrorClass::Quota => {
                        return Err(QuotaStop {
                            model: candidate.clone(),
                            reason,
                        });
                    }
                    ErrorClass::NotFound => {
                        warn!(
                            slot = slot,
                            model = %candidate,
                            error = %reason,
                            "Model unavailable, trying next candidate"
                        );
                        break;
                    }
                    ErrorClass::Transient if attempt < self.policy.max_attempts => {
                        let delay = self.policy.delay_for(attempt);
                        warn!(
                            slot = slot,
                            model = %candidate,
                            attempt = attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %reason,
                            "Attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    ErrorClass::Transient => {
                        warn!(
                            slot = slot,
                            model = %candidate,
                            attempts = attempt,
                            error = %reason,
                            "Attempts exhausted for model"
                        );
                    }
                }
            }
        }

        Ok(SlotOutcome::Failed)
    }

    /// One attempt: build the handle if needed, call the model, then parse,
    /// validate and shuffle the reply.
    async fn attempt(
        &mut self,
        handle: &mut Option<Box<dyn PuzzleModel>>,
        candidate: &str,
        prompt: &str,
    ) -> Result<Puzzle, ModelError> {
        let model = match handle.take() {
            Some(model) => model,
            None => connect_candidate(&self.provider, candidate, &*self.classifier).await?,
        };
        let reply = model.generate(prompt).await;
        let model_id = model.identifier().to_string();
        *handle = Some(model);

        let text = extract_text(&reply?);
        if text.is_empty() {
            return Err(ExtractError::EmptyText.into());
        }
        debug!(model = %model_id, chars = text.len(), "Model replied");

        let payload = isolate_json(&text)?;
        let puzzle = validate_puzzle(&payload)?;
        Ok(shuffle_puzzle(puzzle, &mut self.rng))
    }
}
