//! Oddball - generate a batch of "Odd One Out" puzzles

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use oddball::config::{
    api_key_from_env, model_candidates, GeneratorConfig, API_BASE_ENV, API_KEY_ENV,
    DEFAULT_OUTPUT, DEFAULT_TIMEOUT_SECS, FALLBACK_MODEL_ENV, MODEL_ENV, OUTPUT_ENV,
};
use oddball::generator::RunOutcome;
use oddball::models::DEFAULT_API_BASE;
use oddball::runner::{generate_and_save, init_tracing};

/// Oddball - "Odd One Out" puzzle generator
#[derive(Parser, Debug)]
#[command(name = "oddball")]
#[command(version, about = "Generate a batch of Odd One Out puzzles with Gemini")]
struct Args {
    /// File the puzzle batch is written to
    #[arg(short = 'o', long, env = OUTPUT_ENV, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Primary model
    #[arg(long, env = MODEL_ENV)]
    model: Option<String>,

    /// Model tried when the primary is unavailable or keeps failing
    #[arg(long, env = FALLBACK_MODEL_ENV)]
    fallback_model: Option<String>,

    /// Gemini API endpoint
    #[arg(long, env = API_BASE_ENV, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Change to this directory before running
    #[arg(short = 'C', long, visible_alias = "directory")]
    cwd: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,

    /// Enable verbose (trace-level) logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn into_config(self, api_key: String) -> GeneratorConfig {
        let candidates = model_candidates(self.model.as_deref(), self.fallback_model.as_deref());
        let mut config = GeneratorConfig::new(api_key, candidates);
        config.api_base = self.api_base;
        config.request_timeout = Duration::from_secs(self.timeout_secs.max(1));
        config.output_path = self.output;
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Change directory if requested
    if let Some(cwd) = &args.cwd {
        std::env::set_current_dir(cwd)?;
    }

    init_tracing(args.debug, args.verbose);

    let api_key = api_key_from_env()
        .with_context(|| format!("Export {API_KEY_ENV} with a Gemini API key and retry"))?;
    let config = args.into_config(api_key);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    let outcome = runtime.block_on(generate_and_save(&config))?;

    match outcome {
        RunOutcome::Complete(puzzles) => {
            println!(
                "Saved {} puzzles to {}",
                puzzles.len(),
                config.output_path.display()
            );
        }
        RunOutcome::Incomplete {
            puzzles,
            failed_slots,
        } => {
            println!(
                "Generated {} puzzles; slots {:?} failed. {} was not modified.",
                puzzles.len(),
                failed_slots,
                config.output_path.display()
            );
        }
        RunOutcome::QuotaExhausted { slot, model, .. } => {
            println!(
                "Quota exhausted on {model} at puzzle {slot}. {} was not modified.",
                config.output_path.display()
            );
        }
    }

    Ok(())
}
