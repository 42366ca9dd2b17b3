//! Newtype wrappers for GitHub identifiers.
//!
//! GitHub's GraphQL API addresses every object by an opaque global node ID.
//! Wrapping each kind in its own type prevents passing a discussion ID where an
//! issue ID is expected, which would otherwise type-check as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

node_id!(
    /// Global node ID of a repository (e.g. `R_kgDOKx...`).
    RepoNodeId
);

node_id!(
    /// Global node ID of an issue (e.g. `I_kwDOKx...`).
    IssueNodeId
);

node_id!(
    /// Global node ID of a discussion (e.g. `D_kwDOKx...`).
    DiscussionNodeId
);

node_id!(
    /// Global node ID of an issue or discussion comment.
    CommentNodeId
);

node_id!(
    /// Global node ID of a label.
    LabelId
);

node_id!(
    /// Global node ID of a discussion category.
    CategoryId
);

/// An issue number within a repository.
///
/// Release notes reference issues by number (`#42`), not by node ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(pub u64);

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for IssueNumber {
    fn from(n: u64) -> Self {
        IssueNumber(n)
    }
}
