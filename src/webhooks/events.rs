//! GitHub webhook event types.
//!
//! The bot handles four event types:
//!
//! - `issues` - label changes and closing drive the voting lifecycle
//! - `issue_comment` - `@<bot> /<command>` commands
//! - `release` - release notes are scanned for `#<number>` references
//! - `ping` - sent once when the webhook is configured

use serde::{Deserialize, Serialize};

use crate::types::{CommentNodeId, IssueSnapshot, RepoNodeId};

/// A parsed GitHub webhook event.
///
/// Unknown event types and actions never become a `GitHubEvent`; the parser
/// returns `None` for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    Issues(IssuesEvent),
    IssueComment(IssueCommentEvent),
    Release(ReleaseEvent),
    Ping(PingEvent),
}

impl GitHubEvent {
    /// Returns the repository this event belongs to, if any.
    pub fn repo(&self) -> Option<&RepoRef> {
        match self {
            GitHubEvent::Issues(e) => Some(&e.repo),
            GitHubEvent::IssueComment(e) => Some(&e.repo),
            GitHubEvent::Release(e) => Some(&e.repo),
            GitHubEvent::Ping(_) => None,
        }
    }
}

/// The repository an event was delivered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub node_id: RepoNodeId,
    /// `owner/name`, for logs only.
    pub full_name: String,
    pub private: bool,
}

/// Action performed on an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    Opened,
    Edited,
    Closed,
    Reopened,
    Labeled,
    Unlabeled,
}

/// An `issues` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuesEvent {
    pub repo: RepoRef,
    pub action: IssueAction,
    /// The issue as it is after the action.
    pub issue: IssueSnapshot,
    /// The label added or removed (`labeled`/`unlabeled` only).
    pub label: Option<String>,
    /// Why the issue was closed: `completed`, `not_planned`, or `None`.
    pub state_reason: Option<String>,
}

/// Action performed on an issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    Created,
    Edited,
    Deleted,
}

/// An `issue_comment` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    pub repo: RepoRef,
    pub action: CommentAction,
    /// The issue the comment was posted on.
    pub issue: IssueSnapshot,
    pub comment_id: CommentNodeId,
    /// Empty for `deleted` actions.
    pub body: String,
    pub author_login: String,
    /// The commenter's relationship to the repository, lower-cased
    /// (`owner`, `member`, `collaborator`, `contributor`, `none`, ...).
    pub author_association: String,
}

/// Action performed on a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseAction {
    Published,
    Unpublished,
    Created,
    Edited,
    Deleted,
    Prereleased,
    Released,
}

/// The parts of a release the tracker needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Display name, falling back to the tag when the release is unnamed.
    pub name: String,
    pub tag_name: String,
    pub body: String,
    pub prerelease: bool,
    pub html_url: String,
}

/// A `release` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub repo: RepoRef,
    pub action: ReleaseAction,
    pub release: Release,
}

/// A `ping` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingEvent {
    pub zen: Option<String>,
    pub hook_id: Option<u64>,
}
