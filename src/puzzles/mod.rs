//! Puzzle domain: prompts, reply parsing, validation and shuffling.

pub mod catalog;
mod extract;
mod puzzle;
mod shuffle;

pub use catalog::{response_schema, PROMPTS, PUZZLES_PER_RUN, SYSTEM_INSTRUCTION};
pub use extract::{extract_text, isolate_json, ExtractError};
pub use puzzle::{validate_puzzle, Puzzle, ValidationError, TOKEN_COUNT};
pub use shuffle::shuffle_puzzle;
