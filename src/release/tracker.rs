//! Awaiting-release labelling and release announcements on shipped issues.

use tracing::{debug, info, instrument};

use crate::effects::{GitHubInterpreter, GitHubOps};
use crate::types::labels::{self, AWAITING_RELEASE};
use crate::types::{IssueKind, IssueSnapshot, RepoNodeId};
use crate::webhooks::Release;

use super::ReleaseError;
use super::notes::{extract_issue_numbers, is_tracking_disabled, notification};

/// Labels completed issues and tells them when a release ships them.
///
/// Issues are matched by number here, not by node id.
pub struct ReleaseTracker<I> {
    ops: GitHubOps<I>,
}

impl<I: GitHubInterpreter> ReleaseTracker<I> {
    pub fn new(ops: GitHubOps<I>) -> Self {
        Self { ops }
    }

    /// Adds the awaiting-release label when an issue was closed as completed.
    ///
    /// Returns whether the label was added.
    #[instrument(skip(self, issue), fields(repo = %repo, issue = %issue.number))]
    pub async fn on_issue_closed(
        &self,
        repo: &RepoNodeId,
        issue: &IssueSnapshot,
        state_reason: Option<&str>,
    ) -> Result<bool, ReleaseError> {
        if state_reason != Some("completed") {
            info!(?state_reason, "Skipped: issue not closed as completed");
            return Ok(false);
        }
        if issue.has_label(AWAITING_RELEASE) {
            debug!("Already awaiting release");
            return Ok(false);
        }
        self.ops.add_label(&issue.id, AWAITING_RELEASE, repo).await?;
        info!("Marked issue as awaiting release");
        Ok(true)
    }

    /// Notifies every awaiting-release issue the release notes reference.
    ///
    /// Returns the number of issues notified.
    #[instrument(skip(self, release), fields(repo = %repo, release = %release.tag_name))]
    pub async fn on_release_published(
        &self,
        repo: &RepoNodeId,
        release: &Release,
    ) -> Result<usize, ReleaseError> {
        if is_tracking_disabled(&release.body) {
            info!("Skipped: release tracking disabled in release notes");
            return Ok(0);
        }
        let referenced = extract_issue_numbers(&release.body);
        if referenced.is_empty() {
            debug!("Release notes reference no issues");
            return Ok(0);
        }
        debug!(count = referenced.len(), "Release notes reference issues");

        let mut notified = 0;
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .ops
                .list_issues(repo, &[AWAITING_RELEASE], &[], cursor.as_deref())
                .await?;

            for issue in page.issues.iter().filter(|i| referenced.contains(&i.number)) {
                let kind = IssueKind::from_labels(&issue.labels);
                let body = notification(kind, &release.name, &release.html_url, release.prerelease);
                self.ops.add_comment(&issue.id, body).await?;
                self.ops
                    .remove_label(&issue.id, labels::AWAITING_RELEASE, repo)
                    .await?;
                info!(issue = %issue.number, ?kind, "Notified issue of release");
                notified += 1;
            }

            match page.next_cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        info!(notified, "Release tracking finished");
        Ok(notified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeGitHub, issue};
    use crate::types::IssueState;
    use std::sync::Arc;

    fn repo() -> RepoNodeId {
        RepoNodeId::from("R_src")
    }

    fn tracker(fake: FakeGitHub) -> (ReleaseTracker<FakeGitHub>, Arc<FakeGitHub>) {
        let fake = Arc::new(fake);
        (ReleaseTracker::new(GitHubOps::new(fake.clone())), fake)
    }

    fn release(body: &str, prerelease: bool) -> Release {
        Release {
            name: "1.5.0.0".to_string(),
            tag_name: "1.5.0.0".to_string(),
            body: body.to_string(),
            prerelease,
            html_url: "https://github.com/ClassIsland/ClassIsland/releases/tag/1.5.0.0".to_string(),
        }
    }

    #[tokio::test]
    async fn completed_close_adds_awaiting_release() {
        let fake = FakeGitHub::new();
        fake.add_repo_issue(&repo(), issue("I_1", 1, &[labels::BUG]));
        let (tracker, fake) = tracker(fake);
        let i = fake.issue("I_1").unwrap();

        assert!(tracker.on_issue_closed(&repo(), &i, Some("completed")).await.unwrap());
        assert!(fake.issue_labels("I_1").contains(&AWAITING_RELEASE.to_string()));
    }

    #[tokio::test]
    async fn other_close_reasons_are_ignored() {
        let (tracker, fake) = tracker(FakeGitHub::new());
        let i = issue("I_1", 1, &[]);

        assert!(!tracker.on_issue_closed(&repo(), &i, Some("not_planned")).await.unwrap());
        assert!(!tracker.on_issue_closed(&repo(), &i, None).await.unwrap());
        assert!(fake.effects().is_empty());
    }

    #[tokio::test]
    async fn prerelease_notifies_only_awaiting_issues() {
        let fake = FakeGitHub::new();
        fake.add_repo_issue(&repo(), issue("I_10", 10, &[labels::FEATURE, AWAITING_RELEASE]));
        fake.add_repo_issue(&repo(), issue("I_11", 11, &[labels::FEATURE]));
        let (tracker, fake) = tracker(fake);

        let notified = tracker
            .on_release_published(&repo(), &release("- 新增 #10\n- 优化 #11", true))
            .await
            .unwrap();

        assert_eq!(notified, 1);
        let comments = fake.comments("I_10");
        assert_eq!(comments.len(), 1);
        assert!(comments[0].starts_with("包含此功能请求的版本已在测试通道[1.5.0.0]"));
        assert!(!fake.issue_labels("I_10").contains(&AWAITING_RELEASE.to_string()));

        assert!(fake.comments("I_11").is_empty());
        assert_eq!(fake.issue_labels("I_11"), vec![labels::FEATURE.to_string()]);
    }

    #[tokio::test]
    async fn stable_release_uses_kind_wording() {
        let fake = FakeGitHub::new();
        fake.add_repo_issue(&repo(), issue("I_3", 3, &[labels::BUG, AWAITING_RELEASE]));
        fake.add_repo_issue(&repo(), issue("I_4", 4, &[AWAITING_RELEASE]));
        let (tracker, fake) = tracker(fake);

        tracker
            .on_release_published(&repo(), &release("#3 #4", false))
            .await
            .unwrap();

        assert!(fake.comments("I_3")[0].starts_with("包含此 Bug 的修复的版本已在稳定通道"));
        assert!(fake.comments("I_4")[0].starts_with("包含此提议的版本已在稳定通道"));
    }

    #[tokio::test]
    async fn closed_issues_are_notified_too() {
        let fake = FakeGitHub::new();
        let mut closed = issue("I_5", 5, &[AWAITING_RELEASE]);
        closed.state = IssueState::Closed;
        fake.add_repo_issue(&repo(), closed);
        let (tracker, fake) = tracker(fake);

        let notified = tracker
            .on_release_published(&repo(), &release("fixes #5", false))
            .await
            .unwrap();
        assert_eq!(notified, 1);
        assert_eq!(fake.comments("I_5").len(), 1);
    }

    #[tokio::test]
    async fn no_references_means_no_calls() {
        let (tracker, fake) = tracker(FakeGitHub::new());
        let notified = tracker
            .on_release_published(&repo(), &release("Performance improvements.", false))
            .await
            .unwrap();
        assert_eq!(notified, 0);
        assert!(fake.effects().is_empty());
    }

    #[tokio::test]
    async fn marker_skips_release() {
        let fake = FakeGitHub::new();
        fake.add_repo_issue(&repo(), issue("I_10", 10, &[AWAITING_RELEASE]));
        let (tracker, fake) = tracker(fake);

        tracker
            .on_release_published(&repo(), &release("#10 {!no_release_tracking}", true))
            .await
            .unwrap();
        assert!(fake.effects().is_empty());
    }

    #[tokio::test]
    async fn pages_through_awaiting_issues() {
        let fake = FakeGitHub::new();
        for n in 1..=130 {
            fake.add_repo_issue(&repo(), issue(&format!("I_{n}"), n, &[AWAITING_RELEASE]));
        }
        let (tracker, fake) = tracker(fake);

        let notified = tracker
            .on_release_published(&repo(), &release("#2 #125", false))
            .await
            .unwrap();

        assert_eq!(notified, 2);
        assert_eq!(fake.list_page_sizes(), vec![100, 30]);
    }

    #[tokio::test]
    async fn failed_comment_aborts() {
        let fake = FakeGitHub::new();
        fake.add_repo_issue(&repo(), issue("I_10", 10, &[AWAITING_RELEASE]));
        fake.fail_on("add_comment");
        let (tracker, fake) = tracker(fake);

        let err = tracker
            .on_release_published(&repo(), &release("#10", false))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Remote(_)));
        assert!(fake.issue_labels("I_10").contains(&AWAITING_RELEASE.to_string()));
    }
}
