//! Workspace configuration (`.archgate/config.yaml`).

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Default review id prefix
pub const DEFAULT_PREFIX: &str = "rev";

/// Name of the archgate directory
pub const ARCHGATE_DIR_NAME: &str = ".archgate";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default name of the reference data catalog
pub const CATALOG_FILE_NAME: &str = "catalog.yaml";

/// Default name of the review event log
pub const EVENTS_FILE_NAME: &str = "events.jsonl";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Default caller-facing impact depth cap
pub const DEFAULT_MAX_DEPTH: i32 = 10;

/// Default cap on nodes reached by one impact query
pub const DEFAULT_MAX_NODES: usize = 5000;

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ArchgateConfig {
    /// Review id prefix (e.g. "rev" for "rev-a3f8")
    pub review_prefix: String,

    /// Impact query limits
    #[serde(default)]
    pub impact: ImpactConfig,

    /// Data file locations
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Impact query limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ImpactConfig {
    /// Largest depth a caller may request; larger requests are clamped
    pub max_depth: i32,

    /// Hard cap on reached nodes; `None` disables the cap
    pub max_nodes: Option<usize>,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: Some(DEFAULT_MAX_NODES),
        }
    }
}

/// Data file locations, relative to the `.archgate/` directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Reference data catalog
    pub catalog_file: PathBuf,

    /// Review event log
    pub events_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_file: PathBuf::from(CATALOG_FILE_NAME),
            events_file: PathBuf::from(EVENTS_FILE_NAME),
        }
    }
}

impl ArchgateConfig {
    /// Create a configuration with the given prefix and defaults elsewhere.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            review_prefix: prefix.to_string(),
            impact: ImpactConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    /// Load and validate configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed YAML and
    /// `ConfigError::Invalid` for out-of-range values.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        debug!(path = %path.display(), prefix = %config.review_prefix, "Loaded config");
        Ok(config)
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.review_prefix)?;
        if self.impact.max_depth < 1 {
            return Err(ConfigError::Invalid {
                field: "impact.max-depth",
                reason: format!("must be at least 1, got {}", self.impact.max_depth),
            }
            .into());
        }
        if self.impact.max_nodes == Some(0) {
            return Err(ConfigError::Invalid {
                field: "impact.max-nodes",
                reason: "must be at least 1 (omit it to disable the cap)".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for ArchgateConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Validate review id prefix format: 2 to 20 ASCII alphanumerics.
///
/// Expects pre-trimmed input.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` describing the problem.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    let invalid = |reason: String| ConfigError::Invalid {
        field: "review-prefix",
        reason,
    };

    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(invalid(format!("must be at least {MIN_PREFIX_LENGTH} characters")).into());
    }
    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(invalid(format!("cannot exceed {MAX_PREFIX_LENGTH} characters")).into());
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("must contain only alphanumeric characters".to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::short("ab")]
    #[case::default_prefix("rev")]
    #[case::mixed_case("ArchGate42")]
    #[case::max_length("a1b2c3d4e5f6g7h8i9j0")]
    fn valid_prefixes(#[case] prefix: &str) {
        assert!(validate_prefix(prefix).is_ok());
    }

    #[rstest]
    #[case::too_short("a")]
    #[case::empty("")]
    #[case::too_long("a1b2c3d4e5f6g7h8i9j0k")]
    #[case::hyphen("my-prefix")]
    #[case::space("my prefix")]
    fn invalid_prefixes(#[case] prefix: &str) {
        assert!(validate_prefix(prefix).is_err());
    }

    #[test]
    fn yaml_uses_kebab_case_keys() {
        let yaml = serde_yaml::to_string(&ArchgateConfig::default()).unwrap();
        assert!(yaml.contains("review-prefix: rev"));
        assert!(yaml.contains("max-depth: 10"));
        assert!(yaml.contains("max-nodes: 5000"));
        assert!(yaml.contains("events-file: events.jsonl"));
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config: ArchgateConfig = serde_yaml::from_str("review-prefix: gov\n").unwrap();
        assert_eq!(config.impact, ImpactConfig::default());
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn zero_max_depth_is_invalid() {
        let mut config = ArchgateConfig::default();
        config.impact.max_depth = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("impact.max-depth"));
    }
}
