//! Routes work items to the component that executes them.
//!
//! ```text
//! ┌─────────────┐     ┌──────────┐     ┌────────┐     ┌────────────┐ ──► ReconcileEngine
//! │   axum      │ ──► │ classify │ ──► │ queue  │ ──► │ Dispatcher │ ──► CommandProcessor
//! │  (accepts)  │     └──────────┘     └────────┘     └────────────┘ ──► ReleaseTracker
//! └─────────────┘                          ▲
//!       │ returns 202 Accepted             │
//!       ▼                         sync schedule
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::commands::CommandProcessor;
use crate::effects::GitHubInterpreter;
use crate::reconcile::ReconcileEngine;
use crate::release::ReleaseTracker;
use crate::store::AssociationStore;

use super::message::WorkItem;
use super::worker::{WorkError, WorkHandler};

pub struct Dispatcher<I, S> {
    engine: Arc<ReconcileEngine<I, S>>,
    commands: CommandProcessor<I, S>,
    releases: ReleaseTracker<I>,
}

impl<I, S> Dispatcher<I, S>
where
    I: GitHubInterpreter,
    S: AssociationStore,
{
    pub fn new(
        engine: Arc<ReconcileEngine<I, S>>,
        commands: CommandProcessor<I, S>,
        releases: ReleaseTracker<I>,
    ) -> Self {
        Self {
            engine,
            commands,
            releases,
        }
    }
}

impl<I, S> WorkHandler for Dispatcher<I, S>
where
    I: GitHubInterpreter + 'static,
    S: AssociationStore + 'static,
{
    async fn handle(&self, item: WorkItem) -> Result<(), WorkError> {
        match item {
            WorkItem::Connect { repo, issue } => {
                self.engine.connect(&repo, &issue.id, Some(&issue), false).await?;
            }
            WorkItem::Disconnect { repo, issue } => {
                self.engine.disconnect(&repo, &issue.id, Some(&issue)).await?;
            }
            WorkItem::IssueClosed {
                repo,
                issue,
                state_reason,
            } => {
                self.releases
                    .on_issue_closed(&repo, &issue, state_reason.as_deref())
                    .await?;
            }
            WorkItem::ProcessComment(event) => {
                let outcome = self.commands.process(&event).await;
                debug!(?outcome, "Comment processed");
            }
            WorkItem::ProcessRelease(event) => {
                self.releases
                    .on_release_published(&event.repo.node_id, &event.release)
                    .await?;
            }
            WorkItem::SyncSweep => {
                self.engine.sync_unconnected_issues().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandSettings;
    use crate::effects::GitHubOps;
    use crate::store::SqliteAssociationStore;
    use crate::test_utils::{FakeGitHub, issue, payloads, voting_config};
    use crate::types::{IssueState, RepoNodeId, labels};
    use crate::webhooks::parse_webhook;
    use crate::worker::classify::classify;
    use crate::worker::queue::task_queue;
    use crate::worker::worker::Worker;
    use tokio_util::sync::CancellationToken;

    fn dispatcher(fake: &Arc<FakeGitHub>) -> Dispatcher<FakeGitHub, SqliteAssociationStore> {
        let ops = GitHubOps::new(fake.clone());
        let engine = Arc::new(ReconcileEngine::new(
            ops.clone(),
            SqliteAssociationStore::in_memory().unwrap(),
            voting_config(&["R_src"]),
        ));
        let commands = CommandProcessor::new(
            engine.clone(),
            ops.clone(),
            CommandSettings::new("classisland-bot"),
        );
        Dispatcher::new(engine, commands, ReleaseTracker::new(ops))
    }

    fn items(event_type: &str, payload: &str) -> Vec<WorkItem> {
        parse_webhook(event_type, payload.as_bytes())
            .unwrap()
            .map(classify)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn feature_issue_lifecycle_through_the_worker() {
        let fake = Arc::new(FakeGitHub::new());
        fake.add_repo_issue(
            &RepoNodeId::from("R_src"),
            issue("I_42", 42, &[labels::FEATURE]),
        );
        let handler = Arc::new(dispatcher(&fake));
        let (queue, rx) = task_queue(8);

        for item in items(
            "issues",
            &payloads::issues("labeled", "open", &[labels::FEATURE], Some(labels::FEATURE), None),
        ) {
            queue.enqueue(item).await.unwrap();
        }
        for item in items(
            "issues",
            &payloads::issues(
                "closed",
                "closed",
                &[labels::FEATURE, labels::VOTING],
                None,
                Some("completed"),
            ),
        ) {
            queue.enqueue(item).await.unwrap();
        }
        drop(queue);

        let stats = Worker::new(handler.clone())
            .run(rx, CancellationToken::new())
            .await;
        assert_eq!(stats.failed, 0);

        let rows = handler
            .engine
            .store()
            .list_for_issue(&issue("I_42", 42, &[]).id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_tracking);

        let live = fake.issue("I_42").unwrap();
        assert!(!live.has_label(labels::VOTING));
        assert!(live.has_label(labels::AWAITING_RELEASE));
        assert_eq!(fake.discussion_count(), 1);
    }

    #[tokio::test]
    async fn comment_item_never_fails() {
        let fake = Arc::new(FakeGitHub::new());
        fake.fail_auth();
        let handler = dispatcher(&fake);

        for item in items(
            "issue_comment",
            &payloads::comment("@classisland-bot /track_voting", "OWNER", false),
        ) {
            assert!(handler.handle(item).await.is_ok());
        }
    }

    #[tokio::test]
    async fn sync_failure_propagates() {
        let fake = Arc::new(FakeGitHub::new());
        fake.fail_on("list_issues");
        let handler = dispatcher(&fake);

        let err = handler.handle(WorkItem::SyncSweep).await.unwrap_err();
        assert!(matches!(err, WorkError::Reconcile(_)));
    }

    #[tokio::test]
    async fn release_item_notifies() {
        let fake = Arc::new(FakeGitHub::new());
        let mut done = issue("I_10", 10, &[labels::AWAITING_RELEASE]);
        done.state = IssueState::Closed;
        fake.add_repo_issue(&RepoNodeId::from("R_src"), done);
        let handler = dispatcher(&fake);

        for item in items(
            "release",
            &payloads::release("published", "1.5.0.0", "- #10", false),
        ) {
            handler.handle(item).await.unwrap();
        }
        assert_eq!(fake.comments("I_10").len(), 1);
    }
}
