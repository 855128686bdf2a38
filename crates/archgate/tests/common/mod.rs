//! Fixtures shared across integration tests.

#![allow(dead_code)]

use archgate::domain::{
    Actor, ActorRole, ChangeType, DeploymentProfile, NewReview, NodeId, ReviewAttributes,
    TechStack,
};
use archgate::storage::catalog::Catalog;
use archgate::storage::in_memory::InMemoryStore;
use archgate::workflow::ReviewService;
use std::sync::Arc;

pub const APPLICANT: &str = "alice";

/// A service over a fresh unjournaled store, plus a handle to that store.
pub fn service_with(catalog: Catalog) -> (InMemoryStore, ReviewService) {
    let store = InMemoryStore::new(catalog);
    let shared = Arc::new(store.clone());
    let service = ReviewService::new(shared.clone(), shared, "rev");
    (store, service)
}

/// A service over the example catalog.
pub fn service() -> (InMemoryStore, ReviewService) {
    service_with(Catalog::example())
}

pub fn actor(name: &str, role: ActorRole) -> Actor {
    Actor::new(name, role)
}

pub fn applicant() -> Actor {
    actor(APPLICANT, ActorRole::Applicant)
}

pub fn reviewer() -> Actor {
    actor("bob", ActorRole::Reviewer)
}

pub fn admin() -> Actor {
    actor("root", ActorRole::Admin)
}

/// CHANGE attributes that pass every rule in the example catalog.
pub fn compliant_attributes() -> ReviewAttributes {
    ReviewAttributes::Change {
        deployment: DeploymentProfile {
            description: "Two data centres with monitoring and alerting".to_string(),
            sites: vec!["dc-north".to_string(), "dc-south".to_string()],
        },
        tech_stack: TechStack {
            description: "Rust services on Kubernetes".to_string(),
            components: vec!["rust".to_string(), "postgres".to_string()],
        },
        change_summary: "Split ledger writes onto a dedicated cluster".to_string(),
        rollback_plan: Some("Route writes back to the shared cluster".to_string()),
    }
}

/// CHANGE attributes that fail the CRITICAL multi-site rule.
pub fn single_site_attributes() -> ReviewAttributes {
    ReviewAttributes::Change {
        deployment: DeploymentProfile {
            description: "Primary data centre only, with monitoring".to_string(),
            sites: vec!["dc-north".to_string()],
        },
        tech_stack: TechStack {
            description: "Rust services".to_string(),
            components: vec!["rust".to_string()],
        },
        change_summary: "Move ledger to the new cluster".to_string(),
        rollback_plan: Some("Flip the feature flag".to_string()),
    }
}

pub fn new_review(attributes: ReviewAttributes) -> NewReview {
    NewReview {
        title: "Ledger cluster split".to_string(),
        change_type: ChangeType::Change,
        target_system: NodeId::new("ledger"),
        target_level: 1,
        applicant: APPLICANT.to_string(),
        attributes,
    }
}
