//! Reference data catalog.
//!
//! The catalog is the YAML file holding everything the core treats as an
//! external snapshot: dependency nodes and edges, compliance rules and the
//! system deployment records used for disaster-recovery checks.

use crate::domain::{
    CheckMethod, Criticality, CriticalityTier, DependencyEdge, DependencyNode, EdgeType, NodeId,
    Rule, RuleId, RulePredicate, Severity, SystemRecord, TextField,
};
use crate::error::{Error, Result, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Reference data loaded from `catalog.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalogued systems and applications
    #[serde(default)]
    pub nodes: Vec<DependencyNode>,

    /// Dependency edges, in enumeration order
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,

    /// Active compliance rules, in evaluation order
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Deployment records for disaster-recovery validation
    #[serde(default)]
    pub systems: Vec<SystemRecord>,
}

impl Catalog {
    /// Load and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidCatalog` for unparseable YAML and
    /// `Error::Validation` for duplicate ids or invalid rules.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let catalog: Catalog = serde_yaml::from_str(&content)
            .map_err(|e| StorageError::InvalidCatalog(format!("{}: {e}", path.display())))?;
        catalog.validate()?;
        debug!(
            path = %path.display(),
            nodes = catalog.nodes.len(),
            edges = catalog.edges.len(),
            rules = catalog.rules.len(),
            systems = catalog.systems.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Write the catalog as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| StorageError::InvalidCatalog(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check identity constraints and rule definitions.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for duplicate node, rule or system ids, an
    /// exact duplicate edge, or an invalid rule.
    pub fn validate(&self) -> Result<()> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(&node.id) {
                return Err(Error::Validation(format!("duplicate node id '{}'", node.id)));
            }
        }

        let mut edges = HashSet::new();
        for edge in &self.edges {
            if !edges.insert((&edge.source, &edge.target, edge.edge_type)) {
                return Err(Error::Validation(format!(
                    "duplicate {:?} edge {} -> {}",
                    edge.edge_type, edge.source, edge.target
                )));
            }
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !rule_ids.insert(&rule.id) {
                return Err(Error::Validation(format!("duplicate rule id '{}'", rule.id)));
            }
        }

        let mut system_ids = HashSet::new();
        for system in &self.systems {
            if !system_ids.insert(&system.id) {
                return Err(Error::Validation(format!(
                    "duplicate system id '{}'",
                    system.id
                )));
            }
        }

        Ok(())
    }

    /// Starter catalog written by `archgate init`.
    #[must_use]
    pub fn example() -> Self {
        let node = |id: &str, name: &str, domain: &str| DependencyNode {
            id: NodeId::new(id),
            display_name: name.to_string(),
            domain: domain.to_string(),
        };
        let edge = |source: &str, target: &str, edge_type: EdgeType, criticality: Criticality| {
            DependencyEdge {
                source: NodeId::new(source),
                target: NodeId::new(target),
                edge_type,
                criticality,
            }
        };

        Self {
            nodes: vec![
                node("web-portal", "Customer Web Portal", "channels"),
                node("payments", "Payments Service", "finance"),
                node("ledger", "General Ledger", "finance"),
            ],
            edges: vec![
                edge("web-portal", "payments", EdgeType::SyncCall, Criticality::High),
                edge("payments", "ledger", EdgeType::AsyncMessage, Criticality::High),
                edge("payments", "ledger", EdgeType::SharedStore, Criticality::Medium),
            ],
            rules: vec![
                Rule {
                    id: RuleId::new("DR-01"),
                    name: "Multi-site deployment".to_string(),
                    severity: Severity::Critical,
                    check_method: CheckMethod::Review,
                    description: "Deployments must span at least two sites".to_string(),
                    evaluation_hint: RulePredicate::MultiSiteDeployment { min_sites: 2 },
                },
                Rule {
                    id: RuleId::new("TECH-01"),
                    name: "No deprecated technology".to_string(),
                    severity: Severity::Major,
                    check_method: CheckMethod::Audit,
                    description: "The stack must not use deprecated technology".to_string(),
                    evaluation_hint: RulePredicate::ExcludesTechnologies {
                        deprecated: vec!["struts".to_string(), "java 6".to_string()],
                    },
                },
                Rule {
                    id: RuleId::new("OPS-01"),
                    name: "Rollback plan".to_string(),
                    severity: Severity::Major,
                    check_method: CheckMethod::Review,
                    description: "Changes must declare how they are rolled back".to_string(),
                    evaluation_hint: RulePredicate::RollbackPlanDeclared,
                },
                Rule {
                    id: RuleId::new("OBS-01"),
                    name: "Monitoring described".to_string(),
                    severity: Severity::Minor,
                    check_method: CheckMethod::Test,
                    description: "The deployment description covers monitoring".to_string(),
                    evaluation_hint: RulePredicate::DescriptionMentions {
                        field: TextField::DeploymentDescription,
                        keywords: vec!["monitoring".to_string(), "alerting".to_string()],
                    },
                },
            ],
            systems: vec![
                SystemRecord {
                    id: NodeId::new("payments"),
                    name: "Payments Service".to_string(),
                    tier: CriticalityTier::Core,
                    deployment_sites: vec!["dc-north".to_string(), "dc-south".to_string()],
                },
                SystemRecord {
                    id: NodeId::new("web-portal"),
                    name: "Customer Web Portal".to_string(),
                    tier: CriticalityTier::Important,
                    deployment_sites: vec!["dc-north".to_string()],
                },
            ],
        }
    }
}
