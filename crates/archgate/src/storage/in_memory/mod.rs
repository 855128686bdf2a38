//! In-memory storage backend.
//!
//! A fast store where reference data (the [`Catalog`]) and review state live
//! in RAM behind one `tokio::sync::Mutex`. It implements all three storage
//! traits and doubles as the in-memory fake for tests.
//!
//! # Persistence
//!
//! Review state can be journaled to a JSONL event log with
//! [`load_from_jsonl`]. The log is the source of truth: each line is one
//! [`ReviewEvent`](crate::domain::ReviewEvent) carrying the full review
//! snapshot it committed, so appending that single line is the commit point.
//! Loading replays the log to rebuild every review, its checks and version.
//!
//! # Thread Safety
//!
//! Every operation acquires the mutex. A commit holds it from validation
//! through the journal append to the in-memory apply, so commits are
//! serialized and readers never observe a half-applied action.

mod inner;
mod journal;
mod trait_impl;

use crate::storage::catalog::Catalog;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use journal::{load_from_jsonl, LoadWarning};

/// Thread-safe in-memory store.
///
/// Cloning is cheap and yields a handle to the same data.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

impl InMemoryStore {
    /// Create an unjournaled store serving `catalog`.
    ///
    /// # Example
    ///
    /// ```
    /// use archgate::storage::catalog::Catalog;
    /// use archgate::storage::in_memory::InMemoryStore;
    ///
    /// let store = InMemoryStore::new(Catalog::example());
    /// # drop(store);
    /// ```
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::from_inner(InMemoryStoreInner::new(catalog))
    }

    fn from_inner(inner: InMemoryStoreInner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Replace the reference data.
    ///
    /// Affects evaluations and impact queries made afterwards; stored checks
    /// are not re-evaluated.
    pub async fn replace_catalog(&self, catalog: Catalog) {
        self.inner.lock().await.catalog = catalog;
    }

    /// Copy of the current reference data.
    pub async fn catalog(&self) -> Catalog {
        self.inner.lock().await.catalog.clone()
    }
}
