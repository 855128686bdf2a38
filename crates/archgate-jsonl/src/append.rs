//! Appending to append-only JSONL logs.

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::warn;

/// Appends values to the end of a JSONL file, creating it if absent.
///
/// All values are serialized before the file is touched, so a value that fails
/// to serialize never leaves a partial batch behind. If the file ends in a
/// torn line (no trailing newline), that fragment is terminated first so the
/// new records start on their own line. The write is synced before returning;
/// if writing or syncing fails the file is truncated back to its original
/// length.
///
/// # Errors
///
/// Returns an error if a value fails to serialize, the file cannot be opened,
/// or the write fails.
pub async fn append_jsonl<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut staged = JsonlWriter::new(Vec::new());
    staged.write_all(values.iter()).await?;
    staged.flush().await?;
    let lines = staged.into_inner().into_inner();

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await?;
    if lines.is_empty() {
        return Ok(());
    }

    let original_len = file.metadata().await?.len();
    let mut payload = Vec::with_capacity(lines.len() + 1);
    if ends_mid_line(&mut file, original_len).await? {
        warn!(path = %path.display(), "Terminating torn final line before append");
        payload.push(b'\n');
    }
    payload.extend_from_slice(&lines);

    if let Err(e) = write_synced(&mut file, original_len, &payload).await {
        if let Err(rollback) = truncate_to(&mut file, original_len).await {
            warn!(
                path = %path.display(),
                error = %rollback,
                "Failed to roll back partial append"
            );
        }
        return Err(e.into());
    }
    Ok(())
}

async fn ends_mid_line(file: &mut File, len: u64) -> std::io::Result<bool> {
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}

async fn write_synced(file: &mut File, offset: u64, payload: &[u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(offset)).await?;
    file.write_all(payload).await?;
    file.flush().await?;
    file.sync_data().await
}

async fn truncate_to(file: &mut File, len: u64) -> std::io::Result<()> {
    file.set_len(len).await?;
    file.sync_data().await
}
