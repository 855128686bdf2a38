//! Compliance rules and evaluation results.

use super::string_id;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

string_id! {
    /// Identifier of a compliance rule.
    RuleId
}

/// Severity tier of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// A failure blocks promotion out of DRAFT
    Critical,

    /// Must be addressed before approval
    Major,

    /// Advisory
    Minor,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Major => write!(f, "MAJOR"),
            Severity::Minor => write!(f, "MINOR"),
        }
    }
}

/// How a rule is verified outside this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckMethod {
    /// Checked by human review
    Review,

    /// Checked by automated tests
    Test,

    /// Checked by periodic audit
    Audit,
}

/// Free-text fields of a review that predicates may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    /// Review title
    Title,

    /// Deployment topology description
    DeploymentDescription,

    /// Technology stack description
    TechStackDescription,

    /// Summary of the change (CHANGE reviews only)
    ChangeSummary,

    /// Rollback plan (CHANGE reviews only)
    RollbackPlan,
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextField::Title => "title",
            TextField::DeploymentDescription => "deployment description",
            TextField::TechStackDescription => "tech stack description",
            TextField::ChangeSummary => "change summary",
            TextField::RollbackPlan => "rollback plan",
        };
        write!(f, "{name}")
    }
}

/// The fixed predicate a rule evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RulePredicate {
    /// The deployment declares at least `min_sites` distinct sites. For
    /// `min_sites <= 2` a multi-site keyword in the deployment description
    /// also satisfies the rule.
    MultiSiteDeployment {
        /// Minimum number of distinct sites
        min_sites: usize,
    },

    /// The field mentions at least one keyword (case-insensitive).
    DescriptionMentions {
        /// Field to inspect
        field: TextField,
        /// Accepted keywords
        keywords: Vec<String>,
    },

    /// Neither the tech-stack components nor its description name a
    /// deprecated technology.
    ExcludesTechnologies {
        /// Deprecated technology names
        deprecated: Vec<String>,
    },

    /// CHANGE reviews carry a non-blank rollback plan.
    RollbackPlanDeclared,

    /// The review targets a level no higher than `level`.
    TargetLevelAtMost {
        /// Highest permitted target level
        level: u8,
    },
}

impl RulePredicate {
    /// Check that the predicate parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` describing the bad parameter.
    pub fn validate(&self) -> Result<()> {
        match self {
            RulePredicate::MultiSiteDeployment { min_sites: 0 } => Err(Error::Validation(
                "multi_site_deployment requires min_sites >= 1".to_string(),
            )),
            RulePredicate::DescriptionMentions { keywords, .. } => {
                validate_terms("description_mentions", "keywords", keywords)
            }
            RulePredicate::ExcludesTechnologies { deprecated } => {
                validate_terms("excludes_technologies", "deprecated", deprecated)
            }
            RulePredicate::TargetLevelAtMost { level: 0 } => Err(Error::Validation(
                "target_level_at_most requires level >= 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn validate_terms(kind: &str, field: &str, terms: &[String]) -> Result<()> {
    if terms.is_empty() {
        return Err(Error::Validation(format!("{kind} requires at least one {field} entry")));
    }
    if terms.iter().any(|t| t.trim().is_empty()) {
        return Err(Error::Validation(format!("{kind} has a blank {field} entry")));
    }
    Ok(())
}

/// A named compliance rule.
///
/// Rules are never edited in place once referenced by a check; a changed rule
/// only affects evaluations made after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier
    pub id: RuleId,

    /// Short name
    pub name: String,

    /// Severity tier
    pub severity: Severity,

    /// How the rule is verified outside this engine
    pub check_method: CheckMethod,

    /// What the rule requires
    pub description: String,

    /// Predicate evaluated against review attributes
    pub evaluation_hint: RulePredicate,
}

impl Rule {
    /// Validate the rule definition.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a blank id or name, or bad predicate
    /// parameters.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(Error::Validation("rule id cannot be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(format!("rule {} has an empty name", self.id)));
        }
        self.evaluation_hint
            .validate()
            .map_err(|e| Error::Validation(format!("rule {}: {}", self.id, validation_message(&e))))
    }
}

fn validation_message(err: &Error) -> String {
    match err {
        Error::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Point-in-time result of evaluating one rule against one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    /// Rule evaluated
    pub rule_id: RuleId,

    /// Whether the review satisfied the rule
    pub passed: bool,

    /// Severity copied from the rule at evaluation time
    pub severity: Severity,

    /// Explanation of the outcome
    pub message: String,
}

impl ComplianceCheck {
    /// True for a failed CRITICAL check.
    #[must_use]
    pub fn is_critical_failure(&self) -> bool {
        self.severity == Severity::Critical && !self.passed
    }
}
