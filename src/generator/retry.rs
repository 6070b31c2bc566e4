//! Retry policy and failure classification.
//!
//! Failures from the model are classified from their rendered message into
//! quota exhaustion, model unavailability, or transient trouble. Matching
//! rules live in `SignatureClassifier` so they can change without touching
//! the controller.

use std::time::Duration;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per model candidate before moving to the next one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// Doubles from `base_delay` and never exceeds `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// How a failure should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Usage allowance is used up: abort the whole run.
    Quota,
    /// The model is unknown or unusable: move to the next candidate.
    NotFound,
    /// Anything else: retry with backoff.
    Transient,
}

/// Maps a normalized error description to an `ErrorClass`.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, description: &str) -> ErrorClass;
}

/// Case-insensitive substring matching against known error signatures.
///
/// Quota signatures win over not-found signatures.
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    quota: Vec<String>,
    not_found: Vec<String>,
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::new(
            [
                "quota",
                "resource_exhausted",
                "rate limit",  // matches "rate limit", "rate limited"
                "rate-limit",
                "rate_limit",  // matches "rate_limit_error"
                "ratelimit",   // matches "ratelimited"
                "too many requests",
                "status: 429",
                "status:429",
            ],
            [
                "not found",
                "not_found",
                "unsupported",
                "not supported",
                "status: 404",
                "status:404",
            ],
        )
    }
}

impl SignatureClassifier {
    pub fn new<Q, N>(quota: Q, not_found: N) -> Self
    where
        Q: IntoIterator,
        Q::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let normalize = |s: &str| s.to_lowercase();
        Self {
            quota: quota.into_iter().map(|s| normalize(s.as_ref())).collect(),
            not_found: not_found
                .into_iter()
                .map(|s| normalize(s.as_ref()))
                .collect(),
        }
    }
}

impl ErrorClassifier for SignatureClassifier {
    fn classify(&self, description: &str) -> ErrorClass {
        let lower = description.to_lowercase();
        if self.quota.iter().any(|sig| lower.contains(sig.as_str())) {
            ErrorClass::Quota
        } else if self.not_found.iter().any(|sig| lower.contains(sig.as_str())) {
            ErrorClass::NotFound
        } else {
            ErrorClass::Transient
        }
    }
}
