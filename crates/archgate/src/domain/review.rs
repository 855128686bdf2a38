//! Change reviews, actors and the review audit trail.

use super::graph::NodeId;
use super::rule::{ComplianceCheck, TextField};
use super::string_id;
use super::system::count_distinct_sites;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Lowest target level
pub const MIN_TARGET_LEVEL: u8 = 1;

/// Highest target level
pub const MAX_TARGET_LEVEL: u8 = 3;

string_id! {
    /// Identifier of a review (e.g. `rev-a3f8`).
    ReviewId
}

/// Whether a review introduces a new system or changes an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// A system that does not exist yet
    NewBuild,

    /// A change to an existing system
    Change,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::NewBuild => write!(f, "NEW_BUILD"),
            ChangeType::Change => write!(f, "CHANGE"),
        }
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NEW_BUILD" => Ok(ChangeType::NewBuild),
            "CHANGE" => Ok(ChangeType::Change),
            other => Err(format!("invalid change type '{other}', expected NEW_BUILD or CHANGE")),
        }
    }
}

/// Workflow status of a review.
///
/// Only the review workflow changes this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    /// Being prepared, or sent back by a critical compliance failure
    Draft,

    /// Awaiting a reviewer decision
    Reviewing,

    /// Approved (terminal)
    Approved,

    /// Rejected; may be resubmitted
    Rejected,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Draft => write!(f, "DRAFT"),
            ReviewStatus::Reviewing => write!(f, "REVIEWING"),
            ReviewStatus::Approved => write!(f, "APPROVED"),
            ReviewStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    /// Review created in DRAFT
    Created,

    /// First submission for review
    Submitted,

    /// Submission after a rejection or a blocked attempt
    Resubmitted,

    /// Compliance checks re-evaluated without a status change
    ChecksRerun,

    /// Reviewer approval
    Approved,

    /// Reviewer rejection
    Rejected,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewAction::Created => "CREATED",
            ReviewAction::Submitted => "SUBMITTED",
            ReviewAction::Resubmitted => "RESUBMITTED",
            ReviewAction::ChecksRerun => "CHECKS_RERUN",
            ReviewAction::Approved => "APPROVED",
            ReviewAction::Rejected => "REJECTED",
        };
        write!(f, "{name}")
    }
}

/// Role presented by an already-authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    /// Submits changes; guards also treat the review's own applicant as one
    Applicant,

    /// Decides on submitted reviews
    Reviewer,

    /// Elevated
    Architect,

    /// Elevated
    Admin,

    /// Automation and seeding; never satisfies a human guard
    System,
}

impl ActorRole {
    /// Architects and admins pass every human guard.
    #[must_use]
    pub fn is_elevated(self) -> bool {
        matches!(self, ActorRole::Architect | ActorRole::Admin)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActorRole::Applicant => "APPLICANT",
            ActorRole::Reviewer => "REVIEWER",
            ActorRole::Architect => "ARCHITECT",
            ActorRole::Admin => "ADMIN",
            ActorRole::System => "SYSTEM",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APPLICANT" => Ok(ActorRole::Applicant),
            "REVIEWER" => Ok(ActorRole::Reviewer),
            "ARCHITECT" => Ok(ActorRole::Architect),
            "ADMIN" => Ok(ActorRole::Admin),
            "SYSTEM" => Ok(ActorRole::System),
            other => Err(format!(
                "invalid role '{other}', expected APPLICANT, REVIEWER, ARCHITECT, ADMIN or SYSTEM"
            )),
        }
    }
}

/// An already-resolved actor and the role they act under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor name, compared with `Review::applicant`
    pub name: String,

    /// Role presented for this action
    pub role: ActorRole,
}

impl Actor {
    /// Create an actor.
    pub fn new(name: impl Into<String>, role: ActorRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Declared deployment topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentProfile {
    /// Free-text topology description
    pub description: String,

    /// Data centres or regions the system runs in
    #[serde(default)]
    pub sites: Vec<String>,
}

impl DeploymentProfile {
    /// Number of distinct declared sites.
    #[must_use]
    pub fn site_count(&self) -> usize {
        count_distinct_sites(&self.sites)
    }
}

/// Declared technology stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStack {
    /// Free-text stack description
    pub description: String,

    /// Named components (languages, frameworks, products)
    #[serde(default)]
    pub components: Vec<String>,
}

/// Review attributes, shaped by the review's change type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewAttributes {
    /// Attributes of a NEW_BUILD review
    NewBuild {
        /// Deployment topology
        deployment: DeploymentProfile,
        /// Technology stack
        tech_stack: TechStack,
    },

    /// Attributes of a CHANGE review
    Change {
        /// Deployment topology after the change
        deployment: DeploymentProfile,
        /// Technology stack after the change
        tech_stack: TechStack,
        /// What changes
        change_summary: String,
        /// How the change is undone
        #[serde(default)]
        rollback_plan: Option<String>,
    },
}

impl ReviewAttributes {
    /// Change type these attributes belong to.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        match self {
            ReviewAttributes::NewBuild { .. } => ChangeType::NewBuild,
            ReviewAttributes::Change { .. } => ChangeType::Change,
        }
    }

    /// Declared deployment.
    #[must_use]
    pub fn deployment(&self) -> &DeploymentProfile {
        match self {
            ReviewAttributes::NewBuild { deployment, .. }
            | ReviewAttributes::Change { deployment, .. } => deployment,
        }
    }

    /// Declared technology stack.
    #[must_use]
    pub fn tech_stack(&self) -> &TechStack {
        match self {
            ReviewAttributes::NewBuild { tech_stack, .. }
            | ReviewAttributes::Change { tech_stack, .. } => tech_stack,
        }
    }

    /// Rollback plan, `None` for NEW_BUILD reviews or when undeclared.
    #[must_use]
    pub fn rollback_plan(&self) -> Option<&str> {
        match self {
            ReviewAttributes::Change { rollback_plan, .. } => rollback_plan.as_deref(),
            ReviewAttributes::NewBuild { .. } => None,
        }
    }

    /// Validate the attribute shape against the review's change type.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a kind mismatch, an empty deployment
    /// description or change summary, blank or duplicate sites, or blank
    /// components.
    pub fn validate(&self, change_type: ChangeType) -> Result<()> {
        if self.change_type() != change_type {
            return Err(Error::Validation(format!(
                "attributes are for {} but review is {}",
                self.change_type(),
                change_type
            )));
        }

        let deployment = self.deployment();
        if deployment.description.trim().is_empty() {
            return Err(Error::Validation(
                "deployment description cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for site in &deployment.sites {
            let normalized = site.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(Error::Validation("deployment site cannot be blank".to_string()));
            }
            if !seen.insert(normalized) {
                return Err(Error::Validation(format!(
                    "deployment site '{}' is listed more than once",
                    site.trim()
                )));
            }
        }

        if self.tech_stack().components.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::Validation(
                "tech stack component cannot be blank".to_string(),
            ));
        }

        if let ReviewAttributes::Change { change_summary, .. } = self {
            if change_summary.trim().is_empty() {
                return Err(Error::Validation("change summary cannot be empty".to_string()));
            }
        }

        Ok(())
    }
}

/// A change review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier
    pub id: ReviewId,

    /// Short description of the change
    pub title: String,

    /// NEW_BUILD or CHANGE
    pub change_type: ChangeType,

    /// System the change applies to
    pub target_system: NodeId,

    /// Governance level of the target (1 = most critical)
    pub target_level: u8,

    /// Actor who owns the review
    pub applicant: String,

    /// When the review last entered REVIEWING
    pub submitted_date: Option<DateTime<Utc>>,

    /// Workflow status
    pub status: ReviewStatus,

    /// Declared attributes consulted by compliance rules
    pub attributes: ReviewAttributes,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Text of a field inspected by rule predicates.
    ///
    /// Returns `None` when the field does not exist for this change type or is
    /// undeclared.
    #[must_use]
    pub fn text_field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => Some(&self.title),
            TextField::DeploymentDescription => Some(&self.attributes.deployment().description),
            TextField::TechStackDescription => Some(&self.attributes.tech_stack().description),
            TextField::ChangeSummary => match &self.attributes {
                ReviewAttributes::Change { change_summary, .. } => Some(change_summary),
                ReviewAttributes::NewBuild { .. } => None,
            },
            TextField::RollbackPlan => self.attributes.rollback_plan(),
        }
    }

    /// Whether `actor` is this review's applicant.
    #[must_use]
    pub fn is_applicant(&self, actor: &str) -> bool {
        self.applicant == actor
    }
}

/// Data for creating a new review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    /// Short description of the change
    pub title: String,

    /// NEW_BUILD or CHANGE
    pub change_type: ChangeType,

    /// System the change applies to
    pub target_system: NodeId,

    /// Governance level of the target
    pub target_level: u8,

    /// Actor who owns the review
    pub applicant: String,

    /// Declared attributes
    pub attributes: ReviewAttributes,
}

impl NewReview {
    /// Validate the new review at the boundary.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::Validation(format!(
                "title cannot exceed {MAX_TITLE_LENGTH} characters"
            )));
        }
        if self.target_system.as_str().trim().is_empty() {
            return Err(Error::Validation("target system cannot be empty".to_string()));
        }
        if !(MIN_TARGET_LEVEL..=MAX_TARGET_LEVEL).contains(&self.target_level) {
            return Err(Error::Validation(format!(
                "target level must be between {MIN_TARGET_LEVEL} and {MAX_TARGET_LEVEL}, got {}",
                self.target_level
            )));
        }
        if self.applicant.trim().is_empty() {
            return Err(Error::Validation("applicant cannot be empty".to_string()));
        }
        self.attributes.validate(self.change_type)
    }
}

/// Review state and checks captured by an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSnapshot {
    /// Review after the action
    pub review: Review,

    /// Complete check set after the action (empty if never evaluated)
    pub checks: Vec<ComplianceCheck>,
}

/// An append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// Store-wide, strictly increasing
    pub sequence_id: u64,

    /// Review the action applied to
    pub review_id: ReviewId,

    /// Action taken
    pub action: ReviewAction,

    /// Actor name
    pub actor: String,

    /// Role the actor presented
    pub actor_role: ActorRole,

    /// State committed by the action
    pub snapshot: ReviewSnapshot,

    /// Commit time
    pub timestamp: DateTime<Utc>,
}

/// Result of SUBMITTED and RESUBMITTED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// Status after the action
    pub status: ReviewStatus,

    /// True when a critical failure kept the review in DRAFT
    pub blocked: bool,

    /// Fresh check set
    pub checks: Vec<ComplianceCheck>,
}

/// Result of CHECKS_RERUN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerunOutcome {
    /// Fresh check set
    pub checks: Vec<ComplianceCheck>,
}

/// Result of APPROVED and REJECTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    /// Status after the decision
    pub status: ReviewStatus,
}
