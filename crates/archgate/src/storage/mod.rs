//! Storage abstraction layer for archgate.
//!
//! The governance core never owns its data. It reads reference data and
//! persists review state through three collaborator traits, all object-safe so
//! they can be injected as `Arc<dyn Trait>`:
//!
//! - [`DependencyStore`]: catalogued nodes and dependency edges
//! - [`RuleCatalog`]: the active compliance rules
//! - [`ReviewStore`]: reviews, their current check sets and the append-only
//!   audit trail
//!
//! # Atomicity
//!
//! [`ReviewStore::commit`] is the single write path for reviews. One commit
//! replaces the review record and its complete check set and appends exactly
//! one [`ReviewEvent`], all or nothing. Commits carry the version the writer
//! read; a store must reject a commit whose version is stale, which serializes
//! racing actions on the same review.
//!
//! # Backends
//!
//! - [`in_memory`]: `HashMap`-backed store behind `Arc<Mutex<_>>`, optionally
//!   journaled to a JSONL event log.
//!
//! # Example
//!
//! ```no_run
//! use archgate::storage::catalog::Catalog;
//! use archgate::storage::in_memory::InMemoryStore;
//! use archgate::storage::DependencyStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = InMemoryStore::new(Catalog::default());
//!     let snapshot = store.snapshot().await?;
//!     println!("{} nodes, {} edges", snapshot.nodes.len(), snapshot.edges.len());
//!     Ok(())
//! }
//! ```

use crate::domain::{
    ActorRole, ComplianceCheck, DependencyEdge, DependencyNode, GraphSnapshot, Review,
    ReviewAction, ReviewEvent, ReviewId, Rule,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod catalog;
pub mod in_memory;

/// Read-only source of the dependency graph.
#[async_trait]
pub trait DependencyStore: Send + Sync {
    /// All catalogued nodes.
    async fn list_nodes(&self) -> Result<Vec<DependencyNode>>;

    /// All dependency edges, in a stable enumeration order.
    async fn list_edges(&self) -> Result<Vec<DependencyEdge>>;

    /// Nodes and edges read as one consistent snapshot.
    ///
    /// The default reads them with two calls; stores that can read both under
    /// one lock or transaction should override it.
    async fn snapshot(&self) -> Result<GraphSnapshot> {
        Ok(GraphSnapshot {
            nodes: self.list_nodes().await?,
            edges: self.list_edges().await?,
        })
    }
}

/// Read-only source of compliance rules.
#[async_trait]
pub trait RuleCatalog: Send + Sync {
    /// Rules currently in force, in catalog order.
    async fn list_active_rules(&self) -> Result<Vec<Rule>>;
}

/// A review together with its current check set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    /// The review
    pub review: Review,

    /// Complete check set from the most recent evaluation, or empty
    pub checks: Vec<ComplianceCheck>,

    /// Incremented by every commit; starts at 1 on creation
    pub version: u64,
}

/// Everything one review action writes.
#[derive(Debug, Clone)]
pub struct ReviewCommit {
    /// New review state
    pub review: Review,

    /// Replacement check set
    pub checks: Vec<ComplianceCheck>,

    /// Version the writer read; `None` creates a review that must not exist
    pub expected_version: Option<u64>,

    /// Action recorded in the audit trail
    pub action: ReviewAction,

    /// Actor name
    pub actor: String,

    /// Role the actor presented
    pub actor_role: ActorRole,

    /// Commit time
    pub timestamp: DateTime<Utc>,
}

/// Persistent home of reviews and their audit trail.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Get a review with its checks and version.
    ///
    /// Returns `None` if the review doesn't exist.
    async fn get(&self, id: &ReviewId) -> Result<Option<ReviewRecord>>;

    /// All reviews, oldest first.
    async fn list(&self) -> Result<Vec<Review>>;

    /// Atomically write the review, replace its checks and append one event.
    ///
    /// Returns the appended event with its assigned sequence id.
    ///
    /// # Errors
    ///
    /// - `Error::ReviewAlreadyExists` when creating an existing id
    /// - `Error::ReviewNotFound` when updating a missing review
    /// - `Error::ConcurrentModification` when `expected_version` is stale
    ///
    /// On error nothing is written.
    async fn commit(&self, commit: ReviewCommit) -> Result<ReviewEvent>;

    /// Up to `limit` events for a review, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReviewNotFound` for an unknown review.
    async fn list_events(&self, id: &ReviewId, limit: usize) -> Result<Vec<ReviewEvent>>;
}
