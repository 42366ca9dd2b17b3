//! Release tracking.
//!
//! Issues closed as completed get the awaiting-release label. When a release
//! is published, every awaiting-release issue its notes reference as `#N`
//! gets a comment naming the release and loses the label.

use thiserror::Error;

use crate::github::GitHubApiError;

mod notes;
mod tracker;

pub use notes::{NO_TRACKING_MARKER, extract_issue_numbers, notification};
pub use tracker::ReleaseTracker;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("remote operation failed: {0}")]
    Remote(#[from] GitHubApiError),
}
