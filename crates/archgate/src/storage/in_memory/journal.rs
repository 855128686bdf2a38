//! JSONL event journal for the in-memory store.
//!
//! The journal is append-only. Loading is resilient: problem lines are
//! skipped and reported as [`LoadWarning`]s instead of failing the load.

use super::inner::InMemoryStoreInner;
use super::InMemoryStore;
use crate::domain::{ReviewAction, ReviewEvent, ReviewId};
use crate::error::Result;
use crate::storage::catalog::Catalog;
use archgate_jsonl::{read_jsonl_resilient, Warning as JsonlWarning};
use std::path::Path;
use tracing::{info, warn};

/// Non-fatal problems found while replaying a journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line could not be parsed as an event; skipped.
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parse error
        error: String,
    },

    /// Event for a review with no preceding CREATED event; skipped.
    OrphanedEvent {
        /// Sequence id of the skipped event
        sequence_id: u64,
        /// Review it referenced
        review_id: ReviewId,
    },

    /// Second CREATED event for the same review; skipped.
    DuplicateCreate {
        /// Sequence id of the skipped event
        sequence_id: u64,
        /// Review it referenced
        review_id: ReviewId,
    },

    /// Sequence id not greater than its predecessor; skipped.
    OutOfOrder {
        /// Sequence id of the skipped event
        sequence_id: u64,
        /// Highest sequence id applied before it
        previous: u64,
    },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::MalformedJson { line_number, error } => {
                write!(f, "skipped malformed event at line {line_number}: {error}")
            }
            LoadWarning::OrphanedEvent {
                sequence_id,
                review_id,
            } => write!(
                f,
                "skipped event {sequence_id}: review {review_id} was never created"
            ),
            LoadWarning::DuplicateCreate {
                sequence_id,
                review_id,
            } => write!(
                f,
                "skipped event {sequence_id}: review {review_id} was already created"
            ),
            LoadWarning::OutOfOrder {
                sequence_id,
                previous,
            } => write!(
                f,
                "skipped event {sequence_id}: sequence id not after {previous}"
            ),
        }
    }
}

/// Build a journaled store by replaying the event log at `path`.
///
/// A missing log is an empty store. Subsequent commits are appended to the
/// same file.
///
/// # Errors
///
/// Returns an error only if the file exists but cannot be read.
pub async fn load_from_jsonl(
    catalog: Catalog,
    path: &Path,
) -> Result<(InMemoryStore, Vec<LoadWarning>)> {
    let (events, jsonl_warnings) = read_jsonl_resilient::<ReviewEvent, _>(path).await?;

    let mut warnings: Vec<LoadWarning> = jsonl_warnings
        .into_iter()
        .map(|w| match w {
            JsonlWarning::MalformedJson { line_number, error } => {
                LoadWarning::MalformedJson { line_number, error }
            }
        })
        .collect();

    let mut inner = InMemoryStoreInner::new(catalog);
    let mut previous = 0;
    for event in events {
        if let Some(warning) = check_replayable(&inner, &event, previous) {
            warn!(%warning, "Skipping journal entry");
            warnings.push(warning);
            continue;
        }
        previous = event.sequence_id;
        inner.apply(event);
    }

    info!(
        path = %path.display(),
        reviews = inner.reviews.len(),
        events = inner.events.len(),
        warnings = warnings.len(),
        "Replayed review journal"
    );

    inner.journal = Some(path.to_path_buf());
    Ok((InMemoryStore::from_inner(inner), warnings))
}

fn check_replayable(
    inner: &InMemoryStoreInner,
    event: &ReviewEvent,
    previous: u64,
) -> Option<LoadWarning> {
    if event.sequence_id <= previous {
        return Some(LoadWarning::OutOfOrder {
            sequence_id: event.sequence_id,
            previous,
        });
    }
    let exists = inner.reviews.contains_key(&event.review_id);
    match (event.action, exists) {
        (ReviewAction::Created, true) => Some(LoadWarning::DuplicateCreate {
            sequence_id: event.sequence_id,
            review_id: event.review_id.clone(),
        }),
        (action, false) if action != ReviewAction::Created => Some(LoadWarning::OrphanedEvent {
            sequence_id: event.sequence_id,
            review_id: event.review_id.clone(),
        }),
        _ => None,
    }
}
