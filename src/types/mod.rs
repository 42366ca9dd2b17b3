//! Core domain types for the voting bot.

pub mod association;
pub mod ids;
pub mod issue;
pub mod labels;

pub use association::{Association, NewAssociation, TrackingState};
pub use ids::{
    CategoryId, CommentNodeId, DiscussionNodeId, IssueNodeId, IssueNumber, LabelId, RepoNodeId,
};
pub use issue::{IssueSnapshot, IssueState};
pub use labels::IssueKind;
