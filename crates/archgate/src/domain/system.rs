//! System deployment records consulted by disaster-recovery validation.

use super::graph::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Business criticality tier of a system, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityTier {
    /// Must run in at least two sites
    Core,

    /// Should run in at least two sites
    Important,

    /// No site requirement
    General,
}

impl fmt::Display for CriticalityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticalityTier::Core => write!(f, "core"),
            CriticalityTier::Important => write!(f, "important"),
            CriticalityTier::General => write!(f, "general"),
        }
    }
}

/// A deployed system and the sites it runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRecord {
    /// System identifier (usually also a dependency graph node)
    pub id: NodeId,

    /// Human-readable name
    pub name: String,

    /// Criticality tier
    pub tier: CriticalityTier,

    /// Declared deployment sites
    #[serde(default)]
    pub deployment_sites: Vec<String>,
}

impl SystemRecord {
    /// Number of distinct declared sites.
    #[must_use]
    pub fn site_count(&self) -> usize {
        count_distinct_sites(&self.deployment_sites)
    }
}

/// Counts site names after trimming, ignoring blanks and case.
pub(crate) fn count_distinct_sites(sites: &[String]) -> usize {
    sites
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_count_ignores_blanks_case_and_whitespace() {
        let sites = vec![
            "DC-North".to_string(),
            " dc-north".to_string(),
            String::new(),
            "dc-south".to_string(),
        ];
        assert_eq!(count_distinct_sites(&sites), 2);
    }
}
