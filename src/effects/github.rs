//! GitHub API effect types.
//!
//! These types describe GitHub operations as data. Every id is a GraphQL node
//! id, so an effect is self-contained and can be logged or replayed as is.

use serde::{Deserialize, Serialize};

use crate::types::{
    CategoryId, CommentNodeId, DiscussionNodeId, IssueNodeId, IssueSnapshot, IssueState, LabelId,
    RepoNodeId,
};

/// A GitHub API effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Queries ──────────────────────────────────────────────────────────────
    /// Look up a repository label by name.
    ResolveLabelId { repo: RepoNodeId, name: String },

    /// Look up a discussion category by slug.
    ResolveDiscussionCategory { repo: RepoNodeId, slug: String },

    /// Fetch a single issue.
    GetIssue { issue: IssueNodeId },

    /// Fetch whether a discussion is closed and/or locked.
    GetDiscussionState { discussion: DiscussionNodeId },

    /// One page of a repository's issues filtered by labels and states.
    ///
    /// An empty `states` list means any state.
    ListIssues {
        repo: RepoNodeId,
        labels: Vec<String>,
        states: Vec<IssueState>,
        after: Option<String>,
    },

    // ─── Mutations ────────────────────────────────────────────────────────────
    AddLabels {
        labelable: IssueNodeId,
        label_ids: Vec<LabelId>,
    },

    RemoveLabels {
        labelable: IssueNodeId,
        label_ids: Vec<LabelId>,
    },

    /// Post a comment on an issue.
    AddComment { subject: IssueNodeId, body: String },

    CreateDiscussion {
        repo: RepoNodeId,
        category: CategoryId,
        title: String,
        body: String,
    },

    /// Close a discussion as resolved.
    CloseDiscussion { discussion: DiscussionNodeId },

    /// Lock a discussion thread against further comments.
    LockLockable { lockable: DiscussionNodeId },
}

impl GitHubEffect {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::ResolveLabelId { .. } => "resolve_label_id",
            GitHubEffect::ResolveDiscussionCategory { .. } => "resolve_discussion_category",
            GitHubEffect::GetIssue { .. } => "get_issue",
            GitHubEffect::GetDiscussionState { .. } => "get_discussion_state",
            GitHubEffect::ListIssues { .. } => "list_issues",
            GitHubEffect::AddLabels { .. } => "add_labels",
            GitHubEffect::RemoveLabels { .. } => "remove_labels",
            GitHubEffect::AddComment { .. } => "add_comment",
            GitHubEffect::CreateDiscussion { .. } => "create_discussion",
            GitHubEffect::CloseDiscussion { .. } => "close_discussion",
            GitHubEffect::LockLockable { .. } => "lock_lockable",
        }
    }

    /// True for effects that change remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            GitHubEffect::AddLabels { .. }
                | GitHubEffect::RemoveLabels { .. }
                | GitHubEffect::AddComment { .. }
                | GitHubEffect::CreateDiscussion { .. }
                | GitHubEffect::CloseDiscussion { .. }
                | GitHubEffect::LockLockable { .. }
        )
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Open/locked flags of a discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscussionState {
    pub closed: bool,
    pub locked: bool,
}

/// One page of an issue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePage {
    pub issues: Vec<IssueSnapshot>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

impl IssuePage {
    /// Cursor for the following page, or `None` once the listing is exhausted.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `ResolveLabelId`.
    LabelId(LabelId),

    /// Response to `ResolveDiscussionCategory`.
    CategoryId(CategoryId),

    /// Response to `GetIssue`.
    Issue(IssueSnapshot),

    /// Response to `GetDiscussionState`.
    DiscussionState(DiscussionState),

    /// Response to `ListIssues`.
    IssuePage(IssuePage),

    LabelsAdded,
    LabelsRemoved,

    /// Response to `AddComment`.
    CommentAdded { id: CommentNodeId },

    /// Response to `CreateDiscussion`.
    DiscussionCreated { id: DiscussionNodeId, url: String },

    DiscussionClosed,
    Locked,
}
