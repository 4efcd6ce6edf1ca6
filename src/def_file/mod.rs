//! Reading and writing the flat `KEY = v v v` tilted-ring parameter format.

mod document;
mod parse;
mod serialize;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{DefError, DefResult};

pub use document::DefDocument;
pub use parse::{DefMetadata, MAX_RING_COUNT, ParsedDef, parse, read_ring_count};
pub use serialize::{format_series_line, format_values, serialize};

/// Reads and parses the file at `path`.
pub fn load_path(path: impl AsRef<Path>) -> DefResult<ParsedDef> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DefError::io(path, source))?;
    debug!(path = %path.display(), bytes = text.len(), "read def file");
    parse(&text)
}

/// Writes `text` to `path`, replacing any existing file.
pub fn write_path(path: impl AsRef<Path>, text: &str) -> DefResult<()> {
    let path = path.as_ref();
    fs::write(path, text).map_err(|source| DefError::io(path, source))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote def file");
    Ok(())
}
