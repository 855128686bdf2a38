//! Application context for CLI command execution.
//!
//! `App` locates the workspace, loads the configuration and catalog, replays
//! the review journal and wires the analyzers and services over one shared
//! store.
//!
//! # Example
//!
//! ```no_run
//! use archgate::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let reviews = app.reviews().list_reviews().await?;
//!     println!("{} reviews", reviews.len());
//!     Ok(())
//! }
//! ```

use crate::commands::init::find_archgate_root;
use crate::config::{ArchgateConfig, ARCHGATE_DIR_NAME, CONFIG_FILE_NAME};
use crate::domain::SystemRecord;
use crate::error::{ConfigError, Result};
use crate::impact::{ImpactAnalyzer, ImpactOptions};
use crate::storage::catalog::Catalog;
use crate::storage::in_memory::{load_from_jsonl, InMemoryStore, LoadWarning};
use crate::workflow::ReviewService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Application context for CLI operations.
pub struct App {
    store: InMemoryStore,
    analyzer: ImpactAnalyzer,
    reviews: ReviewService,
    config: ArchgateConfig,
    archgate_dir: PathBuf,
    load_warnings: Vec<LoadWarning>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("archgate_dir", &self.archgate_dir)
            .field("config", &self.config)
            .field("load_warnings", &self.load_warnings.len())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.archgate/`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No archgate workspace is found in the directory tree
    /// - The configuration or catalog cannot be loaded
    /// - The event log exists but cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_archgate_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let archgate_dir = root_dir.join(ARCHGATE_DIR_NAME);

        let config = ArchgateConfig::load(&archgate_dir.join(CONFIG_FILE_NAME)).await?;
        let catalog = Catalog::load(&archgate_dir.join(&config.storage.catalog_file)).await?;
        let (store, load_warnings) =
            load_from_jsonl(catalog, &archgate_dir.join(&config.storage.events_file)).await?;

        for warning in &load_warnings {
            warn!(%warning, "Review journal problem");
        }

        Ok(Self::with_store(store, config, archgate_dir, load_warnings))
    }

    /// Wire an App over an existing store.
    #[must_use]
    pub fn with_store(
        store: InMemoryStore,
        config: ArchgateConfig,
        archgate_dir: PathBuf,
        load_warnings: Vec<LoadWarning>,
    ) -> Self {
        let shared = Arc::new(store.clone());
        let analyzer = ImpactAnalyzer::with_options(
            shared.clone(),
            ImpactOptions {
                max_nodes: config.impact.max_nodes,
            },
        );
        let reviews = ReviewService::new(shared.clone(), shared, config.review_prefix.clone());
        Self {
            store,
            analyzer,
            reviews,
            config,
            archgate_dir,
            load_warnings,
        }
    }

    /// Impact analyzer over the catalog's dependency graph.
    #[must_use]
    pub fn analyzer(&self) -> &ImpactAnalyzer {
        &self.analyzer
    }

    /// Review workflow.
    #[must_use]
    pub fn reviews(&self) -> &ReviewService {
        &self.reviews
    }

    /// Deployment records from the catalog.
    pub async fn systems(&self) -> Vec<SystemRecord> {
        self.store.catalog().await.systems
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &ArchgateConfig {
        &self.config
    }

    /// Path to the `.archgate/` directory.
    #[must_use]
    pub fn archgate_dir(&self) -> &Path {
        &self.archgate_dir
    }

    /// Problems found while replaying the review journal.
    #[must_use]
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use tempfile::TempDir;

    #[tokio::test]
    async fn app_loads_initialized_workspace() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path(), Some("gov")).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();

        assert_eq!(app.config().review_prefix, "gov");
        assert!(app.archgate_dir().ends_with(ARCHGATE_DIR_NAME));
        assert!(app.load_warnings().is_empty());
        assert_eq!(app.systems().await.len(), Catalog::example().systems.len());
    }

    #[tokio::test]
    async fn app_found_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path(), None).await.unwrap();
        let sub_dir = temp_dir.path().join("docs").join("adr");
        std::fs::create_dir_all(&sub_dir).unwrap();

        assert!(App::from_directory(&sub_dir).await.is_ok());
    }

    #[tokio::test]
    async fn uninitialized_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not an archgate workspace"));
    }
}
