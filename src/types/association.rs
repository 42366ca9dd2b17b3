//! Issue ↔ discussion associations and the state derived from them.

use serde::{Deserialize, Serialize};

use super::ids::{CommentNodeId, DiscussionNodeId, IssueNodeId, RepoNodeId};
use super::issue::IssueSnapshot;

/// A persisted link between a feature issue and its voting discussion.
///
/// Rows are never deleted. Ending a vote flips `is_tracking` to false, so the
/// table doubles as an audit trail of every discussion ever opened for an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Surrogate key assigned by the store.
    pub id: i64,
    pub repo_id: RepoNodeId,
    pub discussion_id: DiscussionNodeId,
    pub issue_id: IssueNodeId,
    pub is_tracking: bool,
    /// The cross-reference comment posted on the issue, if it was recorded.
    pub ref_comment_id: Option<CommentNodeId>,
}

/// An association that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssociation {
    pub repo_id: RepoNodeId,
    pub discussion_id: DiscussionNodeId,
    pub issue_id: IssueNodeId,
    pub ref_comment_id: Option<CommentNodeId>,
}

/// Where an issue stands in the voting lifecycle.
///
/// Never stored: always computed from the most recent association row and,
/// when available, the issue's live labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No association; the issue is open and free of voting/wip/reviewing labels.
    Untracked,
    /// An active association exists.
    Voting,
    /// The issue was tracked once and voting has ended.
    Completed,
    /// No association, but the issue is closed or carries a blocking label.
    Ineligible,
}

impl TrackingState {
    /// Derives the state from the latest association row for an issue.
    ///
    /// Without a snapshot the labels are unknown, so an issue with no row is
    /// reported as `Untracked`.
    pub fn derive(latest: Option<&Association>, issue: Option<&IssueSnapshot>) -> Self {
        match latest {
            Some(a) if a.is_tracking => TrackingState::Voting,
            Some(_) => TrackingState::Completed,
            None => match issue {
                Some(i) if !i.is_eligible_for_voting() => TrackingState::Ineligible,
                _ => TrackingState::Untracked,
            },
        }
    }

    /// True if any association row exists.
    pub fn has_association(&self) -> bool {
        matches!(self, TrackingState::Voting | TrackingState::Completed)
    }
}
