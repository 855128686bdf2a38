//! JSONL reading operations.
//!
//! This module provides async functionality for reading JSONL files line-by-line
//! with efficient buffering and line number tracking for error reporting.

use crate::{Error, Result, Warning};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

/// Async reader for JSONL (JSON Lines) data.
///
/// Tracks 1-based line numbers so parse failures can point at the offending
/// line. Blank lines are skipped but still counted.
///
/// # Examples
///
/// ```no_run
/// use archgate_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("events.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_line::<serde_json::Value>().await? {
///     println!("{value}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// 0 before any line is read.
    line_number: usize,
    buffer: String,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Returns the 1-based number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line without parsing it.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the underlying read fails.
    pub async fn next_raw_line(&mut self) -> Result<Option<&str>> {
        loop {
            self.buffer.clear();
            let read = self.reader.read_line(&mut self.buffer).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !self.buffer.trim().is_empty() {
                return Ok(Some(self.buffer.trim_end()));
            }
        }
    }

    /// Reads and deserializes the next record.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFormat` naming the line number when the line is
    /// not a valid record, or `Error::Io` if the read fails.
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let Some(line) = self.next_raw_line().await? else {
            return Ok(None);
        };
        let parsed = serde_json::from_str::<T>(line);
        parsed
            .map(Some)
            .map_err(|e| Error::InvalidFormat(format!("line {}: {e}", self.line_number)))
    }
}

/// Reads every record of a JSONL file, skipping lines that fail to parse.
///
/// A missing file is treated as empty. Each skipped line produces a
/// [`Warning::MalformedJson`].
///
/// # Errors
///
/// Returns `Error::Io` for read failures other than a missing file.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "JSONL file not found, treating as empty");
            return Ok((Vec::new(), Vec::new()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut reader = JsonlReader::new(file);
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    while let Some(line) = reader.next_raw_line().await? {
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                let line_number = reader.line_number();
                warn!(
                    path = %path.display(),
                    line_number,
                    error = %e,
                    "Skipping malformed JSONL line"
                );
                warnings.push(Warning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
            }
        }
    }

    debug!(
        path = %path.display(),
        records = records.len(),
        warnings = warnings.len(),
        "Loaded JSONL file"
    );
    Ok((records, warnings))
}
