//! Maps parsed webhook events to work items.

use tracing::{debug, info};

use crate::types::labels;
use crate::webhooks::{CommentAction, GitHubEvent, IssueAction, IssuesEvent, ReleaseAction};

use super::message::WorkItem;

/// Returns the work items an event should produce, in execution order.
///
/// An empty vector means the event needs no processing.
pub fn classify(event: GitHubEvent) -> Vec<WorkItem> {
    match event {
        GitHubEvent::Issues(e) => classify_issue(e),
        GitHubEvent::IssueComment(e) if e.action == CommentAction::Created => {
            vec![WorkItem::ProcessComment(Box::new(e))]
        }
        GitHubEvent::IssueComment(e) => {
            debug!(action = ?e.action, "Ignoring comment action");
            Vec::new()
        }
        GitHubEvent::Release(e) if e.action == ReleaseAction::Published => {
            vec![WorkItem::ProcessRelease(Box::new(e))]
        }
        GitHubEvent::Release(e) => {
            debug!(action = ?e.action, "Ignoring release action");
            Vec::new()
        }
        GitHubEvent::Ping(p) => {
            info!(hook_id = ?p.hook_id, zen = ?p.zen, "Ping!");
            Vec::new()
        }
    }
}

fn classify_issue(event: IssuesEvent) -> Vec<WorkItem> {
    let repo = event.repo.node_id;
    let issue = event.issue;
    let mut items = Vec::new();

    if issue.is_feature() {
        let labeled_wip = event.action == IssueAction::Labeled
            && event.label.as_deref() == Some(labels::WIP);
        match event.action {
            IssueAction::Labeled | IssueAction::Unlabeled if issue.is_eligible_for_voting() => {
                items.push(WorkItem::Connect {
                    repo: repo.clone(),
                    issue: issue.clone(),
                });
            }
            IssueAction::Closed => {
                items.push(WorkItem::Disconnect {
                    repo: repo.clone(),
                    issue: issue.clone(),
                });
            }
            IssueAction::Labeled if labeled_wip => {
                items.push(WorkItem::Disconnect {
                    repo: repo.clone(),
                    issue: issue.clone(),
                });
            }
            _ => {}
        }
    }

    if event.action == IssueAction::Closed {
        items.push(WorkItem::IssueClosed {
            repo,
            issue,
            state_reason: event.state_reason,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::issue;
    use crate::types::{IssueSnapshot, IssueState, RepoNodeId};
    use crate::webhooks::{IssueCommentEvent, PingEvent, Release, ReleaseEvent, RepoRef};

    fn repo() -> RepoRef {
        RepoRef {
            node_id: RepoNodeId::from("R_src"),
            full_name: "o/r".to_string(),
            private: false,
        }
    }

    fn issues_event(action: IssueAction, issue: IssueSnapshot, label: Option<&str>) -> GitHubEvent {
        GitHubEvent::Issues(IssuesEvent {
            repo: repo(),
            action,
            issue,
            label: label.map(str::to_string),
            state_reason: None,
        })
    }

    fn kinds(items: &[WorkItem]) -> Vec<&'static str> {
        items.iter().map(WorkItem::kind).collect()
    }

    #[test]
    fn labeling_eligible_feature_connects() {
        let i = issue("I_1", 1, &[labels::FEATURE]);
        let items = classify(issues_event(IssueAction::Labeled, i, Some(labels::FEATURE)));
        assert_eq!(kinds(&items), vec!["connect"]);
    }

    #[test]
    fn unlabeling_last_blocker_connects() {
        let i = issue("I_1", 1, &[labels::IMPROVEMENT]);
        let items = classify(issues_event(IssueAction::Unlabeled, i, Some(labels::REVIEWING)));
        assert_eq!(kinds(&items), vec!["connect"]);
    }

    #[test]
    fn labeling_wip_disconnects() {
        let i = issue("I_1", 1, &[labels::FEATURE, labels::VOTING, labels::WIP]);
        let items = classify(issues_event(IssueAction::Labeled, i, Some(labels::WIP)));
        assert_eq!(kinds(&items), vec!["disconnect"]);
    }

    #[test]
    fn labeling_reviewing_does_nothing() {
        let i = issue("I_1", 1, &[labels::FEATURE, labels::REVIEWING]);
        let items = classify(issues_event(IssueAction::Labeled, i, Some(labels::REVIEWING)));
        assert!(items.is_empty());
    }

    #[test]
    fn closing_feature_disconnects_then_tracks_release() {
        let mut i = issue("I_1", 1, &[labels::FEATURE, labels::VOTING]);
        i.state = IssueState::Closed;
        let items = classify(issues_event(IssueAction::Closed, i, None));
        assert_eq!(kinds(&items), vec!["disconnect", "issue_closed"]);
    }

    #[test]
    fn closing_bug_only_tracks_release() {
        let mut i = issue("I_1", 1, &[labels::BUG]);
        i.state = IssueState::Closed;
        let items = classify(issues_event(IssueAction::Closed, i, None));
        assert_eq!(kinds(&items), vec!["issue_closed"]);
    }

    #[test]
    fn non_feature_label_changes_are_ignored() {
        let i = issue("I_1", 1, &[labels::BUG]);
        assert!(classify(issues_event(IssueAction::Labeled, i, Some(labels::BUG))).is_empty());
    }

    #[test]
    fn only_created_comments_and_published_releases() {
        let comment = IssueCommentEvent {
            repo: repo(),
            action: CommentAction::Created,
            issue: issue("I_1", 1, &[]),
            comment_id: "IC_1".into(),
            body: "@classisland-bot /ping".to_string(),
            author_login: "u".to_string(),
            author_association: "member".to_string(),
        };
        let mut edited = comment.clone();
        edited.action = CommentAction::Edited;
        assert_eq!(
            kinds(&classify(GitHubEvent::IssueComment(comment))),
            vec!["process_comment"]
        );
        assert!(classify(GitHubEvent::IssueComment(edited)).is_empty());

        let release = ReleaseEvent {
            repo: repo(),
            action: ReleaseAction::Published,
            release: Release {
                name: "v1".to_string(),
                tag_name: "v1".to_string(),
                body: String::new(),
                prerelease: false,
                html_url: String::new(),
            },
        };
        let mut created = release.clone();
        created.action = ReleaseAction::Created;
        assert_eq!(
            kinds(&classify(GitHubEvent::Release(release))),
            vec!["process_release"]
        );
        assert!(classify(GitHubEvent::Release(created)).is_empty());
    }

    #[test]
    fn ping_enqueues_nothing() {
        let ping = GitHubEvent::Ping(PingEvent {
            zen: None,
            hook_id: Some(1),
        });
        assert!(classify(ping).is_empty());
    }
}
