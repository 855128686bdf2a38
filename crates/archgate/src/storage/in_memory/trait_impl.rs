//! Storage trait implementations for the in-memory store.

use super::InMemoryStore;
use crate::domain::{
    DependencyEdge, DependencyNode, GraphSnapshot, Review, ReviewEvent, ReviewId, Rule,
};
use crate::error::Result;
use crate::storage::{DependencyStore, ReviewCommit, ReviewRecord, ReviewStore, RuleCatalog};
use archgate_jsonl::append_jsonl;
use async_trait::async_trait;
use tracing::{debug, warn};

#[async_trait]
impl DependencyStore for InMemoryStore {
    async fn list_nodes(&self) -> Result<Vec<DependencyNode>> {
        Ok(self.inner.lock().await.catalog.nodes.clone())
    }

    async fn list_edges(&self) -> Result<Vec<DependencyEdge>> {
        Ok(self.inner.lock().await.catalog.edges.clone())
    }

    async fn snapshot(&self) -> Result<GraphSnapshot> {
        let inner = self.inner.lock().await;
        Ok(GraphSnapshot {
            nodes: inner.catalog.nodes.clone(),
            edges: inner.catalog.edges.clone(),
        })
    }
}

#[async_trait]
impl RuleCatalog for InMemoryStore {
    async fn list_active_rules(&self) -> Result<Vec<Rule>> {
        Ok(self.inner.lock().await.catalog.rules.clone())
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn get(&self, id: &ReviewId) -> Result<Option<ReviewRecord>> {
        Ok(self.inner.lock().await.reviews.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Review>> {
        Ok(self.inner.lock().await.reviews_in_order())
    }

    async fn commit(&self, commit: ReviewCommit) -> Result<ReviewEvent> {
        // The lock is held across the journal write so the log order always
        // matches sequence order.
        let mut inner = self.inner.lock().await;

        // === Phase 1: validation (no mutations) ===
        let event = inner.stage(&commit)?;

        // === Phase 2: durable append ===
        if let Some(journal) = inner.journal.clone() {
            if let Err(e) = append_jsonl(&journal, std::slice::from_ref(&event)).await {
                // Never reuse a sequence id that may have reached the file.
                inner.next_sequence = event.sequence_id + 1;
                warn!(
                    review_id = %event.review_id,
                    sequence_id = event.sequence_id,
                    error = %e,
                    "Journal append failed"
                );
                return Err(e.into());
            }
        }

        // === Phase 3: apply ===
        inner.apply(event.clone());
        debug!(
            review_id = %event.review_id,
            action = %event.action,
            sequence_id = event.sequence_id,
            status = %event.snapshot.review.status,
            "Committed review action"
        );
        Ok(event)
    }

    async fn list_events(&self, id: &ReviewId, limit: usize) -> Result<Vec<ReviewEvent>> {
        self.inner.lock().await.events_for(id, limit)
    }
}
