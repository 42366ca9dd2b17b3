//! Label names the bot reads and writes.
//!
//! The monitored repositories use Chinese label names; these constants are the
//! single source of truth for them.

/// New-feature request.
pub const FEATURE: &str = "新功能";

/// Improvement to an existing feature.
pub const IMPROVEMENT: &str = "功能优化";

/// Work in progress. Adding this label ends voting.
pub const WIP: &str = "处理中";

/// Applied while a voting discussion is open for the issue.
pub const VOTING: &str = "投票中";

/// Awaiting triage by a maintainer.
pub const REVIEWING: &str = "待查看";

/// Applied to issues closed as completed, removed once a release ships them.
pub const AWAITING_RELEASE: &str = "待发布";

/// Bug report.
pub const BUG: &str = "Bug";

/// Labels that mark an issue as a feature request.
pub const FEATURE_LABELS: [&str; 2] = [FEATURE, IMPROVEMENT];

/// Labels that prevent a feature issue from entering voting.
pub const BLOCKING_LABELS: [&str; 3] = [VOTING, WIP, REVIEWING];

/// Returns true if any of `labels` is one of `wanted`.
pub fn has_any<S: AsRef<str>>(labels: &[S], wanted: &[&str]) -> bool {
    labels.iter().any(|l| wanted.contains(&l.as_ref()))
}

/// Issue category used to pick release notification wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    FeatureRequest,
    BugFix,
    Proposal,
}

impl IssueKind {
    /// Classifies an issue from its labels. Feature labels win over `Bug`.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        if has_any(labels, &FEATURE_LABELS) {
            IssueKind::FeatureRequest
        } else if has_any(labels, &[BUG]) {
            IssueKind::BugFix
        } else {
            IssueKind::Proposal
        }
    }

    /// Noun phrase substituted into release notifications.
    pub fn noun(&self) -> &'static str {
        match self {
            IssueKind::FeatureRequest => "功能请求",
            IssueKind::BugFix => " Bug 的修复",
            IssueKind::Proposal => "提议",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_prefers_feature_over_bug() {
        assert_eq!(
            IssueKind::from_labels(&[BUG, IMPROVEMENT]),
            IssueKind::FeatureRequest
        );
        assert_eq!(IssueKind::from_labels(&[BUG]), IssueKind::BugFix);
        assert_eq!(IssueKind::from_labels::<&str>(&[]), IssueKind::Proposal);
        assert_eq!(IssueKind::from_labels(&["docs"]), IssueKind::Proposal);
    }

    #[test]
    fn has_any_matches_exact_names() {
        let labels = vec!["新功能".to_string(), "ui".to_string()];
        assert!(has_any(&labels, &FEATURE_LABELS));
        assert!(!has_any(&labels, &BLOCKING_LABELS));
    }
}
