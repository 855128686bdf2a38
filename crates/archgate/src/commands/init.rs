//! Implementation of the `init` command.
//!
//! Creates the `.archgate/` directory with a default configuration, an
//! example catalog to edit and an empty review event log.

use crate::config::{
    validate_prefix, ArchgateConfig, ARCHGATE_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_PREFIX,
};
use crate::error::{ConfigError, Result};
use crate::storage::catalog::Catalog;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Maximum directory depth to traverse when searching for the archgate root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Name of the gitignore file within .archgate
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created archgate directory
    pub archgate_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the example catalog
    pub catalog_file: PathBuf,
    /// Path to the empty event log
    pub events_file: PathBuf,
    /// The prefix used for review ids
    pub prefix: String,
}

/// Initialize a new archgate workspace in `base_dir`.
///
/// # Errors
///
/// Returns an error if:
/// - The `.archgate/` directory already exists
/// - The prefix is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();
    validate_prefix(prefix)?;

    let archgate_dir = base_dir.join(ARCHGATE_DIR_NAME);
    if archgate_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(base_dir.display().to_string()).into());
    }
    fs::create_dir_all(&archgate_dir).await?;

    let config = ArchgateConfig::new(prefix);
    let config_file = archgate_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    let catalog_file = archgate_dir.join(&config.storage.catalog_file);
    Catalog::example().save(&catalog_file).await?;

    let events_file = archgate_dir.join(&config.storage.events_file);
    fs::write(&events_file, "").await?;

    let gitignore_content = "\
# events.jsonl is the review audit trail and should be tracked
";
    fs::write(archgate_dir.join(GITIGNORE_FILE_NAME), gitignore_content).await?;

    info!(dir = %archgate_dir.display(), %prefix, "Initialized archgate workspace");
    Ok(InitResult {
        archgate_dir,
        config_file,
        catalog_file,
        events_file,
        prefix: prefix.to_string(),
    })
}

/// Find the directory containing `.archgate/`, searching upwards.
///
/// Returns `None` if the filesystem root or [`MAX_TRAVERSAL_DEPTH`] is
/// reached first.
#[must_use]
pub fn find_archgate_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    for _ in 0..=MAX_TRAVERSAL_DEPTH {
        if current.join(ARCHGATE_DIR_NAME).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
    None
}
