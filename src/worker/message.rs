//! Work items carried by the task queue.

use std::fmt;

use crate::types::{IssueSnapshot, RepoNodeId};
use crate::webhooks::{IssueCommentEvent, ReleaseEvent};

/// A deferred action for the single consumer.
///
/// Each variant owns everything it needs, so items can be built and queued
/// without any surrounding context and replayed in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Open a voting discussion for a feature issue.
    Connect {
        repo: RepoNodeId,
        issue: IssueSnapshot,
    },

    /// End voting for an issue.
    Disconnect {
        repo: RepoNodeId,
        issue: IssueSnapshot,
    },

    /// Mark a closed issue as awaiting release when it was completed.
    IssueClosed {
        repo: RepoNodeId,
        issue: IssueSnapshot,
        state_reason: Option<String>,
    },

    /// Parse and execute a slash command from a new comment.
    ProcessComment(Box<IssueCommentEvent>),

    /// Notify issues referenced by a published release.
    ProcessRelease(Box<ReleaseEvent>),

    /// Connect every eligible feature issue in every monitored repository.
    SyncSweep,
}

impl WorkItem {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkItem::Connect { .. } => "connect",
            WorkItem::Disconnect { .. } => "disconnect",
            WorkItem::IssueClosed { .. } => "issue_closed",
            WorkItem::ProcessComment(_) => "process_comment",
            WorkItem::ProcessRelease(_) => "process_release",
            WorkItem::SyncSweep => "sync_sweep",
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkItem::Connect { issue, .. }
            | WorkItem::Disconnect { issue, .. }
            | WorkItem::IssueClosed { issue, .. } => write!(f, "{} {}", self.kind(), issue.number),
            WorkItem::ProcessComment(e) => write!(f, "{} on {}", self.kind(), e.issue.number),
            WorkItem::ProcessRelease(e) => write!(f, "{} {}", self.kind(), e.release.tag_name),
            WorkItem::SyncSweep => f.write_str(self.kind()),
        }
    }
}
