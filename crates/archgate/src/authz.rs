//! Role guards for review actions.
//!
//! Authorization is a lookup in a fixed table keyed by action and the
//! capacity an actor acts in. The capacity is derived from the presented role
//! and whether the actor is the review's applicant.

use crate::domain::{ActorRole, ReviewAction};

/// Capacity in which an actor may act on a particular review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capacity {
    /// The review's own applicant, under any human role
    Applicant,
    /// REVIEWER role
    Reviewer,
    /// Architect or admin
    Elevated,
    /// Automation
    System,
}

impl Capacity {
    fn held_by(self, role: ActorRole, is_applicant: bool) -> bool {
        match self {
            Capacity::Applicant => is_applicant && role != ActorRole::System,
            Capacity::Reviewer => role == ActorRole::Reviewer,
            Capacity::Elevated => role.is_elevated(),
            Capacity::System => role == ActorRole::System,
        }
    }
}

const GUARDS: &[(ReviewAction, &[Capacity])] = &[
    (
        ReviewAction::Created,
        &[Capacity::Applicant, Capacity::Elevated, Capacity::System],
    ),
    (
        ReviewAction::Submitted,
        &[Capacity::Applicant, Capacity::Elevated],
    ),
    (
        ReviewAction::Resubmitted,
        &[Capacity::Applicant, Capacity::Elevated],
    ),
    (
        ReviewAction::ChecksRerun,
        &[Capacity::Applicant, Capacity::Reviewer, Capacity::Elevated],
    ),
    (
        ReviewAction::Approved,
        &[Capacity::Reviewer, Capacity::Elevated],
    ),
    (
        ReviewAction::Rejected,
        &[Capacity::Reviewer, Capacity::Elevated],
    ),
];

/// Whether `role` may take `action` on a review.
///
/// `is_applicant` is true when the actor is the review's applicant, which
/// grants applicant capacity on top of whatever the role grants. SYSTEM only
/// ever holds system capacity.
#[must_use]
pub fn authorize(action: ReviewAction, role: ActorRole, is_applicant: bool) -> bool {
    GUARDS
        .iter()
        .find(|(guarded, _)| *guarded == action)
        .is_some_and(|(_, allowed)| {
            allowed
                .iter()
                .any(|capacity| capacity.held_by(role, is_applicant))
        })
}
