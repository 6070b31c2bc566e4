//! Application Runner Module
//!
//! Shared entry points used by the `oddball` binary: logging setup and a
//! full generate-then-persist run.

use std::path::Path;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::GeneratorConfig;
use crate::generator::{PuzzleGenerator, RunOutcome};
use crate::models::{GeminiProvider, ModelProvider};
use crate::output::{write_batch, PersistError};
use crate::puzzles::PROMPTS;

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` wins over the flags when set.
pub fn init_tracing(debug: bool, verbose: bool) {
    let default_filter = if verbose {
        "trace"
    } else if debug {
        "oddball=debug,info"
    } else {
        "oddball=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(debug || verbose)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Generate a batch and write it to `output` if every slot succeeded.
///
/// Incomplete and quota-stopped runs leave `output` as it was.
pub async fn run_batch<P: ModelProvider>(
    generator: &mut PuzzleGenerator<P>,
    output: &Path,
) -> Result<RunOutcome, PersistError> {
    let outcome = generator.run(&PROMPTS).await;

    match &outcome {
        RunOutcome::Complete(puzzles) => {
            write_batch(output, puzzles)?;
            info!(
                path = %output.display(),
                count = puzzles.len(),
                "Saved puzzles"
            );
        }
        RunOutcome::Incomplete {
            puzzles,
            failed_slots,
        } => {
            warn!(
                generated = puzzles.len(),
                failed_slots = ?failed_slots,
                path = %output.display(),
                "Batch incomplete, output left unchanged"
            );
        }
        RunOutcome::QuotaExhausted {
            slot,
            model,
            reason,
        } => {
            error!(
                slot = *slot,
                model = %model,
                reason = %reason,
                path = %output.display(),
                "Quota exhausted, output left unchanged"
            );
        }
    }

    Ok(outcome)
}

/// Run against the Gemini API with `config`.
pub async fn generate_and_save(config: &GeneratorConfig) -> anyhow::Result<RunOutcome> {
    info!(
        candidates = ?config.candidates,
        output = %config.output_path.display(),
        "Starting puzzle generation"
    );

    let provider = GeminiProvider::new(
        config.api_key.clone(),
        config.api_base.clone(),
        config.request_timeout,
    )
    .context("Failed to build Gemini client")?;

    let mut generator = PuzzleGenerator::new(provider, config.candidates.clone())
        .with_retry_policy(config.retry.clone());

    run_batch(&mut generator, &config.output_path)
        .await
        .with_context(|| format!("Failed to write {}", config.output_path.display()))
}
