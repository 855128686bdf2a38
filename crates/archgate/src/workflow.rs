//! The review state machine.
//!
//! [`ReviewService`] is the only writer of review status. Every action runs
//! the same sequence: load the review, check the actor's guard, check the
//! transition, evaluate compliance where the action calls for it, then commit
//! the new status, the replacement check set and one audit event through
//! [`ReviewStore::commit`] with the version that was read. Any failure before
//! the commit leaves the review, its checks and its trail untouched.
//!
//! | Action | Allowed from |
//! |---|---|
//! | SUBMITTED | DRAFT |
//! | RESUBMITTED | DRAFT, REJECTED |
//! | CHECKS_RERUN | DRAFT, REVIEWING, REJECTED |
//! | APPROVED | REVIEWING |
//! | REJECTED | REVIEWING |

use crate::authz::authorize;
use crate::compliance::{has_critical_failure, ComplianceEvaluator};
use crate::domain::{
    Actor, ComplianceCheck, DecisionOutcome, NewReview, RerunOutcome, Review, ReviewAction,
    ReviewEvent, ReviewId, ReviewStatus, SubmitOutcome,
};
use crate::error::{Error, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use crate::storage::{ReviewCommit, ReviewRecord, ReviewStore, RuleCatalog};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Statuses an action may be applied from.
#[must_use]
pub fn allowed_from(action: ReviewAction) -> &'static [ReviewStatus] {
    match action {
        ReviewAction::Created => &[],
        ReviewAction::Submitted => &[ReviewStatus::Draft],
        ReviewAction::Resubmitted => &[ReviewStatus::Draft, ReviewStatus::Rejected],
        ReviewAction::ChecksRerun => &[
            ReviewStatus::Draft,
            ReviewStatus::Reviewing,
            ReviewStatus::Rejected,
        ],
        ReviewAction::Approved | ReviewAction::Rejected => &[ReviewStatus::Reviewing],
    }
}

/// Review workflow controller.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewStore>,
    evaluator: ComplianceEvaluator,
    id_prefix: String,
}

impl ReviewService {
    /// Create a service over the given collaborators.
    ///
    /// `id_prefix` is prepended to generated review ids.
    pub fn new(
        reviews: Arc<dyn ReviewStore>,
        rules: Arc<dyn RuleCatalog>,
        id_prefix: impl Into<String>,
    ) -> Self {
        Self {
            reviews,
            evaluator: ComplianceEvaluator::new(rules),
            id_prefix: id_prefix.into(),
        }
    }

    /// Create a review in DRAFT with no checks.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` for malformed input
    /// - `Error::PermissionDenied` unless the actor is the applicant, elevated
    ///   or SYSTEM
    pub async fn create_review(&self, new: NewReview, actor: &Actor) -> Result<Review> {
        new.validate()?;

        let existing = self.reviews.list().await?;
        let mut generator = IdGenerator::new(IdGeneratorConfig {
            prefix: self.id_prefix.clone(),
            database_size: existing.len(),
        });
        for review in &existing {
            generator.register_id(review.id.as_str());
        }
        let id = generator.generate(&new.title, new.target_system.as_str(), &new.applicant)?;

        let action = ReviewAction::Created;
        if !authorize(action, actor.role, new.applicant == actor.name) {
            return Err(permission_denied(actor, &id, action));
        }

        let now = Utc::now();
        let review = Review {
            id,
            title: new.title.trim().to_string(),
            change_type: new.change_type,
            target_system: new.target_system,
            target_level: new.target_level,
            applicant: new.applicant,
            submitted_date: None,
            status: ReviewStatus::Draft,
            attributes: new.attributes,
            created_at: now,
            updated_at: now,
        };

        self.reviews
            .commit(ReviewCommit {
                review: review.clone(),
                checks: Vec::new(),
                expected_version: None,
                action,
                actor: actor.name.clone(),
                actor_role: actor.role,
                timestamp: now,
            })
            .await?;

        info!(
            review_id = %review.id,
            applicant = %review.applicant,
            target_system = %review.target_system,
            "Created review"
        );
        Ok(review)
    }

    /// Submit a DRAFT review for review.
    ///
    /// A critical compliance failure keeps it in DRAFT with `blocked` set.
    ///
    /// # Errors
    ///
    /// `ReviewNotFound`, `PermissionDenied`, `InvalidTransition`,
    /// `Validation` (rule evaluation) or `ConcurrentModification`.
    pub async fn submit_review(&self, id: &ReviewId, actor: &Actor) -> Result<SubmitOutcome> {
        self.submit_as(id, actor, ReviewAction::Submitted).await
    }

    /// Submit again from DRAFT or REJECTED.
    ///
    /// # Errors
    ///
    /// Same as [`submit_review`](Self::submit_review).
    pub async fn resubmit_review(&self, id: &ReviewId, actor: &Actor) -> Result<SubmitOutcome> {
        self.submit_as(id, actor, ReviewAction::Resubmitted).await
    }

    /// Re-evaluate compliance without changing status.
    ///
    /// # Errors
    ///
    /// Same as [`submit_review`](Self::submit_review).
    pub async fn rerun_checks(&self, id: &ReviewId, actor: &Actor) -> Result<RerunOutcome> {
        let action = ReviewAction::ChecksRerun;
        let record = self.load_for(id, actor, action).await?;
        let checks = self.evaluator.evaluate(&record.review).await?;

        let mut review = record.review.clone();
        review.updated_at = Utc::now();
        self.commit(&record, review, checks.clone(), action, actor)
            .await?;
        Ok(RerunOutcome { checks })
    }

    /// Approve a REVIEWING review.
    ///
    /// # Errors
    ///
    /// `ReviewNotFound`, `PermissionDenied`, `InvalidTransition` or
    /// `ConcurrentModification`.
    pub async fn approve_review(&self, id: &ReviewId, actor: &Actor) -> Result<DecisionOutcome> {
        self.decide(id, actor, ReviewAction::Approved, ReviewStatus::Approved)
            .await
    }

    /// Reject a REVIEWING review.
    ///
    /// # Errors
    ///
    /// Same as [`approve_review`](Self::approve_review).
    pub async fn reject_review(&self, id: &ReviewId, actor: &Actor) -> Result<DecisionOutcome> {
        self.decide(id, actor, ReviewAction::Rejected, ReviewStatus::Rejected)
            .await
    }

    /// A review with its current checks and version.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReviewNotFound` for an unknown id.
    pub async fn get_review(&self, id: &ReviewId) -> Result<ReviewRecord> {
        self.reviews
            .get(id)
            .await?
            .ok_or_else(|| Error::ReviewNotFound(id.clone()))
    }

    /// All reviews, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn list_reviews(&self) -> Result<Vec<Review>> {
        self.reviews.list().await
    }

    /// Up to `limit` audit events for a review, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReviewNotFound` for an unknown id.
    pub async fn list_events(&self, id: &ReviewId, limit: usize) -> Result<Vec<ReviewEvent>> {
        self.reviews.list_events(id, limit).await
    }

    async fn submit_as(
        &self,
        id: &ReviewId,
        actor: &Actor,
        action: ReviewAction,
    ) -> Result<SubmitOutcome> {
        let record = self.load_for(id, actor, action).await?;
        let checks = self.evaluator.evaluate(&record.review).await?;
        let blocked = has_critical_failure(&checks);

        let now = Utc::now();
        let mut review = record.review.clone();
        review.updated_at = now;
        if blocked {
            review.status = ReviewStatus::Draft;
        } else {
            review.status = ReviewStatus::Reviewing;
            review.submitted_date = Some(now);
        }
        let status = review.status;

        self.commit(&record, review, checks.clone(), action, actor)
            .await?;
        if blocked {
            info!(review_id = %id, %action, "Submission blocked by critical compliance failure");
        }
        Ok(SubmitOutcome {
            status,
            blocked,
            checks,
        })
    }

    async fn decide(
        &self,
        id: &ReviewId,
        actor: &Actor,
        action: ReviewAction,
        status: ReviewStatus,
    ) -> Result<DecisionOutcome> {
        let record = self.load_for(id, actor, action).await?;

        let mut review = record.review.clone();
        review.status = status;
        review.updated_at = Utc::now();
        let checks = record.checks.clone();
        self.commit(&record, review, checks, action, actor).await?;
        Ok(DecisionOutcome { status })
    }

    /// Load a review and check the actor's guard, then the transition.
    async fn load_for(
        &self,
        id: &ReviewId,
        actor: &Actor,
        action: ReviewAction,
    ) -> Result<ReviewRecord> {
        let record = self.get_review(id).await?;
        let review = &record.review;

        if !authorize(action, actor.role, review.is_applicant(&actor.name)) {
            debug!(
                review_id = %id,
                actor = %actor.name,
                role = %actor.role,
                %action,
                "Permission denied"
            );
            return Err(permission_denied(actor, id, action));
        }
        if !allowed_from(action).contains(&review.status) {
            return Err(Error::InvalidTransition {
                review_id: id.clone(),
                status: review.status,
                action,
            });
        }
        Ok(record)
    }

    async fn commit(
        &self,
        read: &ReviewRecord,
        review: Review,
        checks: Vec<ComplianceCheck>,
        action: ReviewAction,
        actor: &Actor,
    ) -> Result<ReviewEvent> {
        let timestamp = review.updated_at;
        let event = self
            .reviews
            .commit(ReviewCommit {
                review,
                checks,
                expected_version: Some(read.version),
                action,
                actor: actor.name.clone(),
                actor_role: actor.role,
                timestamp,
            })
            .await?;
        info!(
            review_id = %event.review_id,
            %action,
            actor = %actor.name,
            from = %read.review.status,
            to = %event.snapshot.review.status,
            "Review action committed"
        );
        Ok(event)
    }
}

fn permission_denied(actor: &Actor, id: &ReviewId, action: ReviewAction) -> Error {
    Error::PermissionDenied {
        actor: actor.name.clone(),
        role: actor.role,
        review_id: id.clone(),
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_accept_no_action() {
        for action in [
            ReviewAction::Submitted,
            ReviewAction::Resubmitted,
            ReviewAction::ChecksRerun,
            ReviewAction::Approved,
            ReviewAction::Rejected,
        ] {
            assert!(!allowed_from(action).contains(&ReviewStatus::Approved));
        }
    }

    #[test]
    fn only_resubmit_and_rerun_leave_rejected() {
        let from_rejected: Vec<ReviewAction> = [
            ReviewAction::Submitted,
            ReviewAction::Resubmitted,
            ReviewAction::ChecksRerun,
            ReviewAction::Approved,
            ReviewAction::Rejected,
        ]
        .into_iter()
        .filter(|a| allowed_from(*a).contains(&ReviewStatus::Rejected))
        .collect();
        assert_eq!(
            from_rejected,
            vec![ReviewAction::Resubmitted, ReviewAction::ChecksRerun]
        );
    }
}
