//! Issue ↔ discussion reconciliation.
//!
//! The engine moves issues between the derived states in
//! [`TrackingState`](crate::types::TrackingState):
//!
//! ```text
//!             connect                 disconnect
//! Untracked ───────────▶ Voting ────────────────▶ Completed
//!                          ▲                          │
//!                          └──── connect (forced) ────┘
//! ```
//!
//! Each transition is a fixed sequence of remote calls followed by one store
//! write, with no rollback. A failure partway through leaves partial state
//! that the next sync sweep or a repeated transition repairs.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::github::GitHubApiError;
use crate::store::StoreError;
use crate::types::{Association, RepoNodeId};

mod engine;
pub mod templates;

pub use engine::ReconcileEngine;

/// A transition that started and did not finish.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("remote operation failed: {0}")]
    Remote(#[from] GitHubApiError),

    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// True when the installation token could not be obtained.
    pub fn is_auth(&self) -> bool {
        matches!(self, ReconcileError::Remote(e) if e.is_auth())
    }
}

/// Why a transition did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The issue already has (or had) a discussion.
    AlreadyAssociated,
    /// The repository is not in the monitored-repository mapping.
    UnmappedRepository,
    /// There is no active association to end.
    NoActiveAssociation,
    /// The issue is closed or carries a voting/wip/reviewing label.
    NotEligible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(Association),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    Disconnected(Association),
    Skipped(SkipReason),
}

/// Tally of one sync sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub scanned: usize,
    pub connected: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Where voting discussions live and which repositories feed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingConfig {
    /// The repository that hosts every voting discussion.
    pub voting_repository: RepoNodeId,
    /// Monitored repository → discussion category slug in the voting repository.
    pub categories: BTreeMap<RepoNodeId, String>,
}

impl VotingConfig {
    pub fn category_for(&self, repo: &RepoNodeId) -> Option<&str> {
        self.categories.get(repo).map(String::as_str)
    }

    pub fn is_monitored(&self, repo: &RepoNodeId) -> bool {
        self.categories.contains_key(repo)
    }

    pub fn monitored(&self) -> impl Iterator<Item = &RepoNodeId> {
        self.categories.keys()
    }
}
