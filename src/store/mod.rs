//! Durable storage for issue ↔ discussion associations.
//!
//! Every operation is a single step. Nothing here spans a remote call, so a
//! crash between a successful GitHub mutation and the matching store write can
//! leave the two sides divergent; the sync sweep heals that.

use std::future::Future;

use thiserror::Error;

use crate::types::{Association, IssueNodeId, NewAssociation};

mod sqlite;

pub use sqlite::SqliteAssociationStore;

/// Errors from the association store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database rejected an operation.
    #[error("storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// The row referenced by an update no longer exists.
    #[error("association {0} not found")]
    NotFound(i64),
}

impl StoreError {
    pub(crate) fn storage(operation: &'static str, message: impl ToString) -> Self {
        StoreError::Storage {
            operation,
            message: message.to_string(),
        }
    }
}

/// Persistence for [`Association`] rows.
///
/// Invariant: at most one row per issue has `is_tracking = true`.
pub trait AssociationStore: Send + Sync {
    /// True if any row (active or not) exists for the issue.
    fn exists_for_issue(
        &self,
        issue: &IssueNodeId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// The active row for the issue, if any.
    fn find_active_for_issue(
        &self,
        issue: &IssueNodeId,
    ) -> impl Future<Output = Result<Option<Association>, StoreError>> + Send;

    /// The most recently inserted row for the issue, of any status.
    fn latest_for_issue(
        &self,
        issue: &IssueNodeId,
    ) -> impl Future<Output = Result<Option<Association>, StoreError>> + Send;

    /// Every row for the issue, oldest first.
    fn list_for_issue(
        &self,
        issue: &IssueNodeId,
    ) -> impl Future<Output = Result<Vec<Association>, StoreError>> + Send;

    /// Inserts a new active row.
    ///
    /// If the issue already has an active row it is flipped to inactive in the
    /// same transaction, so the single-active-row invariant always holds.
    fn insert(
        &self,
        record: NewAssociation,
    ) -> impl Future<Output = Result<Association, StoreError>> + Send;

    /// Flips the row's tracking flag to false and persists it.
    fn mark_untracked(
        &self,
        record: &Association,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
