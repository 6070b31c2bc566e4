//! Puzzle batch persistence.
//!
//! A batch is written only when it holds exactly [`PUZZLES_PER_RUN`] puzzles.
//! The file is written to a temporary sibling and persisted into place, so a
//! crash mid-write never leaves a truncated document behind. The temporary
//! file is removed on every failure path.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::puzzles::{Puzzle, PUZZLES_PER_RUN};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("refusing to write an incomplete batch ({actual} of {expected} puzzles)")]
    IncompleteBatch { expected: usize, actual: usize },
}

/// Render puzzles as a JSON array indented with four spaces.
pub fn render_batch(puzzles: &[Puzzle]) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    puzzles.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Replace the file at `path` with `puzzles`.
pub fn write_batch(path: &Path, puzzles: &[Puzzle]) -> Result<(), PersistError> {
    if puzzles.len() != PUZZLES_PER_RUN {
        return Err(PersistError::IncompleteBatch {
            expected: PUZZLES_PER_RUN,
            actual: puzzles.len(),
        });
    }

    let bytes = render_batch(puzzles)?;

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    // Dropping the handle on any error below deletes the temporary file.
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = bytes.len(), "Batch written");
    Ok(())
}
