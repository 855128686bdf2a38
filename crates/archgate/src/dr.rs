//! Disaster-recovery site-count validation.

use crate::domain::{CriticalityTier, NodeId, SystemRecord};
use serde::{Deserialize, Serialize};

/// Minimum distinct sites for core and important systems.
pub const MIN_DR_SITES: usize = 2;

/// A system that falls short of the site requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrFinding {
    /// System identifier
    pub system_id: NodeId,

    /// System name
    pub name: String,

    /// Distinct sites declared
    pub site_count: usize,
}

impl From<&SystemRecord> for DrFinding {
    fn from(system: &SystemRecord) -> Self {
        Self {
            system_id: system.id.clone(),
            name: system.name.clone(),
            site_count: system.site_count(),
        }
    }
}

/// Outcome of [`validate_disaster_recovery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrReport {
    /// True when no core system is a violation
    pub core_compliant: bool,

    /// Core systems with fewer than [`MIN_DR_SITES`] sites
    pub core_violations: Vec<DrFinding>,

    /// Important systems with fewer than [`MIN_DR_SITES`] sites
    pub important_warnings: Vec<DrFinding>,
}

/// Check every system's distinct site count against its tier.
///
/// Findings keep the input order. General systems are never reported.
#[must_use]
pub fn validate_disaster_recovery(systems: &[SystemRecord]) -> DrReport {
    let short = |tier: CriticalityTier| -> Vec<DrFinding> {
        systems
            .iter()
            .filter(|s| s.tier == tier && s.site_count() < MIN_DR_SITES)
            .map(DrFinding::from)
            .collect()
    };

    let core_violations = short(CriticalityTier::Core);
    DrReport {
        core_compliant: core_violations.is_empty(),
        core_violations,
        important_warnings: short(CriticalityTier::Important),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(id: &str, tier: CriticalityTier, sites: &[&str]) -> SystemRecord {
        SystemRecord {
            id: NodeId::new(id),
            name: id.to_uppercase(),
            tier,
            deployment_sites: sites.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn core_system_in_one_site_is_a_violation() {
        let report = validate_disaster_recovery(&[
            system("ledger", CriticalityTier::Core, &["dc-north", " DC-North"]),
            system("payments", CriticalityTier::Core, &["dc-north", "dc-south"]),
        ]);
        assert!(!report.core_compliant);
        assert_eq!(report.core_violations.len(), 1);
        assert_eq!(report.core_violations[0].system_id.as_str(), "ledger");
        assert_eq!(report.core_violations[0].site_count, 1);
    }

    #[test]
    fn important_shortfall_is_only_a_warning() {
        let report = validate_disaster_recovery(&[
            system("portal", CriticalityTier::Important, &["dc-north"]),
            system("wiki", CriticalityTier::General, &[]),
        ]);
        assert!(report.core_compliant);
        assert!(report.core_violations.is_empty());
        assert_eq!(report.important_warnings.len(), 1);
        assert_eq!(report.important_warnings[0].name, "PORTAL");
    }

    #[test]
    fn no_systems_is_compliant() {
        let report = validate_disaster_recovery(&[]);
        assert!(report.core_compliant);
        assert!(report.important_warnings.is_empty());
    }
}
