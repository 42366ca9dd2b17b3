//! Issue snapshots as seen in webhook payloads and GraphQL queries.

use serde::{Deserialize, Serialize};

use super::ids::{IssueNodeId, IssueNumber};
use super::labels::{self, BLOCKING_LABELS, FEATURE_LABELS};

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Parses GitHub's state string, accepting both REST (`open`) and
    /// GraphQL (`OPEN`) spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Some(IssueState::Open),
            "closed" => Some(IssueState::Closed),
            _ => None,
        }
    }
}

/// The fields of an issue the bot needs to mirror it into a discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSnapshot {
    pub id: IssueNodeId,
    pub number: IssueNumber,
    pub title: String,
    /// Markdown body. GitHub sends `null` for empty bodies; stored as "".
    pub body: String,
    pub url: String,
    pub state: IssueState,
    pub labels: Vec<String>,
    /// Login of the user who opened the issue.
    pub author_login: String,
}

impl IssueSnapshot {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    /// Feature or improvement request.
    pub fn is_feature(&self) -> bool {
        labels::has_any(&self.labels, &FEATURE_LABELS)
    }

    /// Open and free of voting/wip/reviewing labels.
    pub fn is_eligible_for_voting(&self) -> bool {
        self.state == IssueState::Open && !labels::has_any(&self.labels, &BLOCKING_LABELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::issue;

    #[test]
    fn state_parses_both_spellings() {
        assert_eq!(IssueState::parse("open"), Some(IssueState::Open));
        assert_eq!(IssueState::parse("CLOSED"), Some(IssueState::Closed));
        assert_eq!(IssueState::parse("merged"), None);
    }

    #[test]
    fn eligibility_requires_open_and_no_blocking_label() {
        let open = issue("I_1", 1, &[labels::FEATURE]);
        assert!(open.is_feature());
        assert!(open.is_eligible_for_voting());

        let wip = issue("I_2", 2, &[labels::FEATURE, labels::WIP]);
        assert!(!wip.is_eligible_for_voting());

        let mut closed = issue("I_3", 3, &[labels::IMPROVEMENT]);
        closed.state = IssueState::Closed;
        assert!(closed.is_feature());
        assert!(!closed.is_eligible_for_voting());
    }
}
