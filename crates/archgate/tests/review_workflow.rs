//! Integration tests for the review state machine.
//!
//! Exercises the workflow end to end against the in-memory store: guards,
//! the transition table, compliance gating and the audit trail.

mod common;

use archgate::domain::{ActorRole, ReviewAction, ReviewId, ReviewStatus, RulePredicate};
use archgate::error::{Error, ErrorKind};
use archgate::storage::catalog::Catalog;
use archgate::storage::{ReviewCommit, ReviewStore};
use archgate::workflow::ReviewService;
use chrono::Utc;
use common::*;
use rstest::rstest;

async fn create(service: &ReviewService) -> ReviewId {
    service
        .create_review(new_review(compliant_attributes()), &applicant())
        .await
        .unwrap()
        .id
}

/// Drive a compliant review into `status` using an admin where needed.
async fn review_in(service: &ReviewService, status: ReviewStatus) -> ReviewId {
    let id = create(service).await;
    if status == ReviewStatus::Draft {
        return id;
    }
    service.submit_review(&id, &applicant()).await.unwrap();
    match status {
        ReviewStatus::Approved => {
            service.approve_review(&id, &admin()).await.unwrap();
        }
        ReviewStatus::Rejected => {
            service.reject_review(&id, &admin()).await.unwrap();
        }
        _ => {}
    }
    id
}

async fn event_count(service: &ReviewService, id: &ReviewId) -> usize {
    service.list_events(id, usize::MAX).await.unwrap().len()
}

// ========== Creation ==========

#[tokio::test]
async fn created_review_is_draft_with_no_checks() {
    let (_, service) = service();
    let review = service
        .create_review(new_review(compliant_attributes()), &applicant())
        .await
        .unwrap();

    assert!(review.id.as_str().starts_with("rev-"));
    assert_eq!(review.status, ReviewStatus::Draft);
    assert!(review.submitted_date.is_none());

    let record = service.get_review(&review.id).await.unwrap();
    assert!(record.checks.is_empty());
    assert_eq!(record.version, 1);

    let events = service.list_events(&review.id, 10).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, ReviewAction::Created);
}

#[tokio::test]
async fn create_on_behalf_of_someone_else_requires_elevation() {
    let (_, service) = service();
    let err = service
        .create_review(new_review(compliant_attributes()), &reviewer())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(service.list_reviews().await.unwrap().is_empty());

    service
        .create_review(new_review(compliant_attributes()), &admin())
        .await
        .unwrap();
    service
        .create_review(
            new_review(compliant_attributes()),
            &actor("seeder", ActorRole::System),
        )
        .await
        .unwrap();
    assert_eq!(service.list_reviews().await.unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_review_is_rejected_at_the_boundary() {
    let (_, service) = service();
    let mut new = new_review(compliant_attributes());
    new.target_level = 0;
    let err = service.create_review(new, &applicant()).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ========== Submission ==========

#[tokio::test]
async fn compliant_submission_moves_to_reviewing() {
    let (_, service) = service();
    let id = create(&service).await;

    let outcome = service.submit_review(&id, &applicant()).await.unwrap();

    assert_eq!(outcome.status, ReviewStatus::Reviewing);
    assert!(!outcome.blocked);
    let rule_ids: Vec<&str> = outcome.checks.iter().map(|c| c.rule_id.as_str()).collect();
    assert_eq!(rule_ids, vec!["DR-01", "TECH-01", "OPS-01", "OBS-01"]);
    assert!(outcome.checks.iter().all(|c| c.passed));

    let record = service.get_review(&id).await.unwrap();
    assert_eq!(record.review.status, ReviewStatus::Reviewing);
    assert!(record.review.submitted_date.is_some());
    assert_eq!(record.checks, outcome.checks);
}

#[tokio::test]
async fn critical_failure_keeps_review_in_draft() {
    let (_, service) = service();
    let id = service
        .create_review(new_review(single_site_attributes()), &applicant())
        .await
        .unwrap()
        .id;

    let outcome = service.submit_review(&id, &applicant()).await.unwrap();

    assert_eq!(outcome.status, ReviewStatus::Draft);
    assert!(outcome.blocked);
    assert!(outcome.checks.iter().any(|c| c.is_critical_failure()));

    let events = service.list_events(&id, 1).await.unwrap();
    assert_eq!(events[0].action, ReviewAction::Submitted);
    assert_eq!(events[0].snapshot.review.status, ReviewStatus::Draft);
    assert!(events[0].snapshot.review.submitted_date.is_none());
}

#[tokio::test]
async fn non_applicant_submit_is_denied_without_event_or_evaluation() {
    let (_, service) = service();
    let id = create(&service).await;

    let err = service
        .submit_review(&id, &actor("mallory", ActorRole::Applicant))
        .await
        .unwrap_err();

    match &err {
        Error::PermissionDenied {
            actor,
            role,
            review_id,
            action,
        } => {
            assert_eq!(actor, "mallory");
            assert_eq!(*role, ActorRole::Applicant);
            assert_eq!(review_id, &id);
            assert_eq!(*action, ReviewAction::Submitted);
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
    assert_eq!(event_count(&service, &id).await, 1);
    assert!(service.get_review(&id).await.unwrap().checks.is_empty());
}

#[tokio::test]
async fn system_never_satisfies_a_human_guard() {
    let (_, service) = service();
    let id = create(&service).await;
    let system = actor(APPLICANT, ActorRole::System);

    assert_eq!(
        service.submit_review(&id, &system).await.unwrap_err().kind(),
        ErrorKind::PermissionDenied
    );
    assert_eq!(
        service.rerun_checks(&id, &system).await.unwrap_err().kind(),
        ErrorKind::PermissionDenied
    );
}

#[tokio::test]
async fn permission_is_checked_before_invalid_rule_evaluation() {
    let mut catalog = Catalog::example();
    catalog.rules[0].evaluation_hint = RulePredicate::MultiSiteDeployment { min_sites: 0 };
    let (_, service) = service_with(catalog);
    let id = create(&service).await;

    let err = service.submit_review(&id, &reviewer()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = service.submit_review(&id, &applicant()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(event_count(&service, &id).await, 1);
    assert_eq!(
        service.get_review(&id).await.unwrap().review.status,
        ReviewStatus::Draft
    );
}

#[tokio::test]
async fn blocked_resubmission_returns_rejected_review_to_draft() {
    let (store, service) = service();
    let id = review_in(&service, ReviewStatus::Rejected).await;
    let events_before = event_count(&service, &id).await;

    let mut catalog = store.catalog().await;
    catalog.rules[0].evaluation_hint = RulePredicate::MultiSiteDeployment { min_sites: 3 };
    store.replace_catalog(catalog).await;

    let outcome = service.resubmit_review(&id, &applicant()).await.unwrap();

    assert_eq!(outcome.status, ReviewStatus::Draft);
    assert!(outcome.blocked);
    assert!(outcome.checks[0].is_critical_failure());
    assert_eq!(
        service.get_review(&id).await.unwrap().review.status,
        ReviewStatus::Draft
    );

    let events = service.list_events(&id, usize::MAX).await.unwrap();
    assert_eq!(events.len(), events_before + 1);
    assert_eq!(events[0].action, ReviewAction::Resubmitted);
    assert_eq!(events[0].snapshot.review.status, ReviewStatus::Draft);
}

// ========== Decisions ==========

#[tokio::test]
async fn reviewer_approval_appends_exactly_one_event() {
    let (_, service) = service();
    let id = review_in(&service, ReviewStatus::Reviewing).await;
    let before = service.list_events(&id, usize::MAX).await.unwrap();

    let outcome = service.approve_review(&id, &reviewer()).await.unwrap();
    assert_eq!(outcome.status, ReviewStatus::Approved);

    let after = service.list_events(&id, usize::MAX).await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    let newest = &after[0];
    assert_eq!(newest.action, ReviewAction::Approved);
    assert_eq!(newest.actor, "bob");
    assert_eq!(newest.actor_role, ActorRole::Reviewer);
    assert!(newest.sequence_id > before[0].sequence_id);
}

#[tokio::test]
async fn applicant_cannot_approve() {
    let (_, service) = service();
    let id = review_in(&service, ReviewStatus::Reviewing).await;
    let err = service.approve_review(&id, &applicant()).await.unwrap_err();
    assert_eq!(err.kind().http_status(), 403);
}

#[tokio::test]
async fn rejected_review_can_be_resubmitted() {
    let (_, service) = service();
    let id = review_in(&service, ReviewStatus::Rejected).await;

    let outcome = service.resubmit_review(&id, &applicant()).await.unwrap();
    assert_eq!(outcome.status, ReviewStatus::Reviewing);

    let actions: Vec<ReviewAction> = service
        .list_events(&id, usize::MAX)
        .await
        .unwrap()
        .iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            ReviewAction::Resubmitted,
            ReviewAction::Rejected,
            ReviewAction::Submitted,
            ReviewAction::Created,
        ]
    );
}

// ========== Transition table ==========

#[derive(Debug, Clone, Copy)]
enum Act {
    Submit,
    Resubmit,
    Rerun,
    Approve,
    Reject,
}

impl Act {
    fn action(self) -> ReviewAction {
        match self {
            Act::Submit => ReviewAction::Submitted,
            Act::Resubmit => ReviewAction::Resubmitted,
            Act::Rerun => ReviewAction::ChecksRerun,
            Act::Approve => ReviewAction::Approved,
            Act::Reject => ReviewAction::Rejected,
        }
    }

    async fn run(self, service: &ReviewService, id: &ReviewId) -> Result<(), Error> {
        let actor = admin();
        match self {
            Act::Submit => service.submit_review(id, &actor).await.map(|_| ()),
            Act::Resubmit => service.resubmit_review(id, &actor).await.map(|_| ()),
            Act::Rerun => service.rerun_checks(id, &actor).await.map(|_| ()),
            Act::Approve => service.approve_review(id, &actor).await.map(|_| ()),
            Act::Reject => service.reject_review(id, &actor).await.map(|_| ()),
        }
    }
}

#[rstest]
#[case(ReviewStatus::Draft, Act::Submit, true)]
#[case(ReviewStatus::Draft, Act::Resubmit, true)]
#[case(ReviewStatus::Draft, Act::Rerun, true)]
#[case(ReviewStatus::Draft, Act::Approve, false)]
#[case(ReviewStatus::Draft, Act::Reject, false)]
#[case(ReviewStatus::Reviewing, Act::Submit, false)]
#[case(ReviewStatus::Reviewing, Act::Resubmit, false)]
#[case(ReviewStatus::Reviewing, Act::Rerun, true)]
#[case(ReviewStatus::Reviewing, Act::Approve, true)]
#[case(ReviewStatus::Reviewing, Act::Reject, true)]
#[case(ReviewStatus::Approved, Act::Submit, false)]
#[case(ReviewStatus::Approved, Act::Resubmit, false)]
#[case(ReviewStatus::Approved, Act::Rerun, false)]
#[case(ReviewStatus::Approved, Act::Approve, false)]
#[case(ReviewStatus::Approved, Act::Reject, false)]
#[case(ReviewStatus::Rejected, Act::Submit, false)]
#[case(ReviewStatus::Rejected, Act::Resubmit, true)]
#[case(ReviewStatus::Rejected, Act::Rerun, true)]
#[case(ReviewStatus::Rejected, Act::Approve, false)]
#[case(ReviewStatus::Rejected, Act::Reject, false)]
#[tokio::test]
async fn transition_table(#[case] from: ReviewStatus, #[case] act: Act, #[case] legal: bool) {
    let (_, service) = service();
    let id = review_in(&service, from).await;
    let events_before = event_count(&service, &id).await;

    let result = act.run(&service, &id).await;

    if legal {
        result.unwrap();
        assert_eq!(event_count(&service, &id).await, events_before + 1);
    } else {
        match result.unwrap_err() {
            Error::InvalidTransition { status, action, .. } => {
                assert_eq!(status, from);
                assert_eq!(action, act.action());
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(event_count(&service, &id).await, events_before);
        assert_eq!(service.get_review(&id).await.unwrap().review.status, from);
    }
}

// ========== Re-evaluation ==========

#[tokio::test]
async fn rerun_is_deterministic_and_keeps_status() {
    let (_, service) = service();
    let id = review_in(&service, ReviewStatus::Reviewing).await;

    let first = service.rerun_checks(&id, &reviewer()).await.unwrap();
    let second = service.rerun_checks(&id, &reviewer()).await.unwrap();

    assert_eq!(first.checks, second.checks);
    assert_eq!(
        service.get_review(&id).await.unwrap().review.status,
        ReviewStatus::Reviewing
    );
    let newest = service.list_events(&id, 2).await.unwrap();
    assert!(newest.iter().all(|e| e.action == ReviewAction::ChecksRerun));
}

#[tokio::test]
async fn rerun_replaces_the_whole_check_set_with_current_rules() {
    let (store, service) = service();
    let id = review_in(&service, ReviewStatus::Reviewing).await;

    let mut catalog = store.catalog().await;
    catalog.rules.truncate(2);
    store.replace_catalog(catalog).await;

    let outcome = service.rerun_checks(&id, &applicant()).await.unwrap();
    assert_eq!(outcome.checks.len(), 2);
    assert_eq!(service.get_review(&id).await.unwrap().checks.len(), 2);
}

// ========== Audit trail and concurrency ==========

#[tokio::test]
async fn events_are_most_recent_first_and_limited() {
    let (_, service) = service();
    let id = review_in(&service, ReviewStatus::Approved).await;

    let all = service.list_events(&id, 10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].sequence_id > w[1].sequence_id));

    let limited = service.list_events(&id, 1).await.unwrap();
    assert_eq!(limited[0].action, ReviewAction::Approved);
}

#[tokio::test]
async fn unknown_review_is_not_found() {
    let (_, service) = service();
    let missing = ReviewId::new("rev-zzzz");

    for err in [
        service.submit_review(&missing, &applicant()).await.unwrap_err(),
        service.get_review(&missing).await.unwrap_err(),
        service.list_events(&missing, 5).await.unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[tokio::test]
async fn stale_writer_is_rejected() {
    let (store, service) = service();
    let id = review_in(&service, ReviewStatus::Reviewing).await;
    let stale = store.get(&id).await.unwrap().unwrap();

    service.approve_review(&id, &reviewer()).await.unwrap();

    let mut review = stale.review.clone();
    review.status = ReviewStatus::Rejected;
    let err = store
        .commit(ReviewCommit {
            review,
            checks: stale.checks.clone(),
            expected_version: Some(stale.version),
            action: ReviewAction::Rejected,
            actor: "carol".to_string(),
            actor_role: ActorRole::Reviewer,
            timestamp: Utc::now(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConcurrentModification { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        service.get_review(&id).await.unwrap().review.status,
        ReviewStatus::Approved
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_decisions_commit_at_most_once() {
    let (_, service) = service();
    let id = review_in(&service, ReviewStatus::Reviewing).await;

    let approve = {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move { service.approve_review(&id, &reviewer()).await })
    };
    let reject = {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move { service.reject_review(&id, &admin()).await })
    };
    let results = [approve.await.unwrap(), reject.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidTransition | ErrorKind::Conflict
        ));
    }
    let decisions = service
        .list_events(&id, usize::MAX)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| matches!(e.action, ReviewAction::Approved | ReviewAction::Rejected))
        .count();
    assert_eq!(decisions, 1);
}
