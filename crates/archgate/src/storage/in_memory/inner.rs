//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{Review, ReviewEvent, ReviewId, ReviewSnapshot};
use crate::error::{Error, Result};
use crate::storage::catalog::Catalog;
use crate::storage::{ReviewCommit, ReviewRecord};
use std::collections::HashMap;
use std::path::PathBuf;

/// Inner storage structure (not thread-safe).
///
/// Every review write goes through [`stage`](Self::stage) followed by
/// [`apply`](Self::apply) while the caller holds the outer mutex. Replaying a
/// journal uses the same `apply`, so a store rebuilt from its event log is
/// identical to the one that wrote it.
#[derive(Debug)]
pub(crate) struct InMemoryStoreInner {
    /// Reference data served to the dependency store and rule catalog traits
    pub(super) catalog: Catalog,

    /// Current record per review
    pub(super) reviews: HashMap<ReviewId, ReviewRecord>,

    /// Review ids in creation order
    pub(super) creation_order: Vec<ReviewId>,

    /// Every event, in sequence order
    pub(super) events: Vec<ReviewEvent>,

    /// Sequence id the next event receives
    pub(super) next_sequence: u64,

    /// JSONL event log each commit is appended to before it is applied
    pub(super) journal: Option<PathBuf>,
}

impl InMemoryStoreInner {
    /// Create a new empty storage instance
    pub(crate) fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            reviews: HashMap::new(),
            creation_order: Vec::new(),
            events: Vec::new(),
            next_sequence: 1,
            journal: None,
        }
    }

    /// Validate a commit against current state and build its event.
    ///
    /// Performs no mutation.
    pub(super) fn stage(&self, commit: &ReviewCommit) -> Result<ReviewEvent> {
        let id = &commit.review.id;
        match (self.reviews.get(id), commit.expected_version) {
            (Some(_), None) => return Err(Error::ReviewAlreadyExists(id.clone())),
            (None, Some(_)) => return Err(Error::ReviewNotFound(id.clone())),
            (Some(current), Some(expected)) if current.version != expected => {
                return Err(Error::ConcurrentModification {
                    review_id: id.clone(),
                    expected,
                    found: current.version,
                });
            }
            _ => {}
        }

        Ok(ReviewEvent {
            sequence_id: self.next_sequence,
            review_id: id.clone(),
            action: commit.action,
            actor: commit.actor.clone(),
            actor_role: commit.actor_role,
            snapshot: ReviewSnapshot {
                review: commit.review.clone(),
                checks: commit.checks.clone(),
            },
            timestamp: commit.timestamp,
        })
    }

    /// Apply a staged or replayed event.
    pub(super) fn apply(&mut self, event: ReviewEvent) {
        let ReviewSnapshot { review, checks } = event.snapshot.clone();
        match self.reviews.get_mut(&event.review_id) {
            Some(record) => {
                record.review = review;
                record.checks = checks;
                record.version += 1;
            }
            None => {
                self.creation_order.push(event.review_id.clone());
                self.reviews.insert(
                    event.review_id.clone(),
                    ReviewRecord {
                        review,
                        checks,
                        version: 1,
                    },
                );
            }
        }
        self.next_sequence = self.next_sequence.max(event.sequence_id + 1);
        self.events.push(event);
    }

    /// Reviews in creation order.
    pub(super) fn reviews_in_order(&self) -> Vec<Review> {
        self.creation_order
            .iter()
            .filter_map(|id| self.reviews.get(id))
            .map(|record| record.review.clone())
            .collect()
    }

    /// Up to `limit` events for a review, newest first.
    pub(super) fn events_for(&self, id: &ReviewId, limit: usize) -> Result<Vec<ReviewEvent>> {
        if !self.reviews.contains_key(id) {
            return Err(Error::ReviewNotFound(id.clone()));
        }
        Ok(self
            .events
            .iter()
            .rev()
            .filter(|event| &event.review_id == id)
            .take(limit)
            .cloned()
            .collect())
    }
}
