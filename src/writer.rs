//! JSON result persistence for completed pipeline runs.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::pipeline::EmbeddingRecord;

/// Errors that can emerge while persisting the result document.
#[derive(Debug)]
pub enum WriteError {
    /// Filesystem failure (permissions, disk space, invalid path).
    Io(io::Error),
    /// The records could not be serialized.
    Serialize(serde_json::Error),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Io(err) => write!(f, "failed to write output: {err}"),
            WriteError::Serialize(err) => write!(f, "failed to serialize output: {err}"),
        }
    }
}

impl std::error::Error for WriteError {}

/// Serializes the records as a pretty-printed JSON array to `path`. An empty
/// run writes `[]`. Failure here is fatal to the run and never recovered.
pub fn write_results(records: &[EmbeddingRecord], path: &Path) -> Result<(), WriteError> {
    let file = File::create(path).map_err(WriteError::Io)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(WriteError::Serialize)?;
    writer.write_all(b"\n").map_err(WriteError::Io)?;
    writer.flush().map_err(WriteError::Io)?;
    Ok(())
}
