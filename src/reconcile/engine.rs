//! Connect, Disconnect and the sync sweep.

use tracing::{debug, info, instrument, warn};

use crate::effects::{GitHubInterpreter, GitHubOps};
use crate::store::{AssociationStore, StoreError};
use crate::types::labels::{self, FEATURE_LABELS};
use crate::types::{
    Association, IssueNodeId, IssueSnapshot, NewAssociation, RepoNodeId, TrackingState,
};

use super::templates;
use super::{
    ConnectOutcome, DisconnectOutcome, ReconcileError, SkipReason, SyncReport, VotingConfig,
};

/// Drives issues through the voting lifecycle.
pub struct ReconcileEngine<I, S> {
    ops: GitHubOps<I>,
    store: S,
    voting: VotingConfig,
}

impl<I, S> ReconcileEngine<I, S>
where
    I: GitHubInterpreter,
    S: AssociationStore,
{
    pub fn new(ops: GitHubOps<I>, store: S, voting: VotingConfig) -> Self {
        Self { ops, store, voting }
    }

    pub fn voting(&self) -> &VotingConfig {
        &self.voting
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Derives the issue's state from its latest association row and, when
    /// given, its live labels.
    ///
    /// Every guard in this engine goes through here.
    pub async fn tracking_state(
        &self,
        issue: &IssueNodeId,
        snapshot: Option<&IssueSnapshot>,
    ) -> Result<(TrackingState, Option<Association>), StoreError> {
        let latest = self.store.latest_for_issue(issue).await?;
        let state = TrackingState::derive(latest.as_ref(), snapshot);
        Ok((state, latest))
    }

    /// Opens a voting discussion for an issue.
    ///
    /// Without `force`, an issue that has ever had a discussion is left alone,
    /// as is one whose snapshot shows it is not eligible. With `force`, a new
    /// discussion is always created; a discussion that is still voting is
    /// closed, locked and untracked first.
    ///
    /// When `snapshot` is `None` the issue is fetched.
    #[instrument(skip(self, snapshot), fields(repo = %repo, issue = %issue_id))]
    pub async fn connect(
        &self,
        repo: &RepoNodeId,
        issue_id: &IssueNodeId,
        snapshot: Option<&IssueSnapshot>,
        force: bool,
    ) -> Result<ConnectOutcome, ReconcileError> {
        let (state, latest) = self.tracking_state(issue_id, snapshot).await?;
        if !force {
            if state.has_association() {
                info!(?state, "Skipped connecting: issue already associated");
                return Ok(ConnectOutcome::Skipped(SkipReason::AlreadyAssociated));
            }
            if state == TrackingState::Ineligible {
                info!("Skipped connecting: issue not eligible for voting");
                return Ok(ConnectOutcome::Skipped(SkipReason::NotEligible));
            }
        }

        let Some(category) = self.voting.category_for(repo) else {
            info!("Skipped connecting: repository not monitored");
            return Ok(ConnectOutcome::Skipped(SkipReason::UnmappedRepository));
        };

        if let (TrackingState::Voting, Some(previous)) = (state, latest) {
            self.retire_discussion(&previous).await?;
            info!(
                discussion = %previous.discussion_id,
                "Retired previous voting discussion"
            );
        }

        let issue = match snapshot {
            Some(s) => s.clone(),
            None => self.ops.get_issue(issue_id).await?,
        };

        let (discussion_id, discussion_url) = self
            .ops
            .create_discussion(
                &self.voting.voting_repository,
                category,
                &issue.title,
                &templates::discussion_body(&issue),
            )
            .await?;
        debug!(discussion = %discussion_id, "Created voting discussion");

        self.ops.add_label(issue_id, labels::VOTING, repo).await?;

        let comment_id = self
            .ops
            .add_comment(issue_id, templates::cross_reference_comment(&discussion_url))
            .await?;

        let association = self
            .store
            .insert(NewAssociation {
                repo_id: repo.clone(),
                discussion_id,
                issue_id: issue_id.clone(),
                ref_comment_id: Some(comment_id),
            })
            .await?;

        info!(
            number = %issue.number,
            discussion = %association.discussion_id,
            "Connected issue to voting discussion"
        );
        Ok(ConnectOutcome::Connected(association))
    }

    /// Ends voting for an issue.
    ///
    /// Each remote step checks first, so repeating a half-finished disconnect
    /// only performs the steps that are still missing: the voting label is
    /// removed only if present, and the discussion is closed and locked only
    /// if it is not already.
    #[instrument(skip(self, snapshot), fields(repo = %repo, issue = %issue_id))]
    pub async fn disconnect(
        &self,
        repo: &RepoNodeId,
        issue_id: &IssueNodeId,
        snapshot: Option<&IssueSnapshot>,
    ) -> Result<DisconnectOutcome, ReconcileError> {
        let (state, latest) = self.tracking_state(issue_id, snapshot).await?;
        let association = match (state, latest) {
            (TrackingState::Voting, Some(a)) => a,
            _ => {
                info!(?state, "Skipped disconnecting: no active association");
                return Ok(DisconnectOutcome::Skipped(SkipReason::NoActiveAssociation));
            }
        };

        if !self.voting.is_monitored(repo) {
            info!("Skipped disconnecting: repository not monitored");
            return Ok(DisconnectOutcome::Skipped(SkipReason::UnmappedRepository));
        }

        let issue = match snapshot {
            Some(s) => s.clone(),
            None => self.ops.get_issue(issue_id).await?,
        };
        if issue.has_label(labels::VOTING) {
            self.ops.remove_label(issue_id, labels::VOTING, repo).await?;
        } else {
            debug!("Voting label already removed");
        }

        self.retire_discussion(&association).await?;

        info!(
            discussion = %association.discussion_id,
            "Disconnected issue from voting discussion"
        );
        Ok(DisconnectOutcome::Disconnected(Association {
            is_tracking: false,
            ..association
        }))
    }

    /// Closes and locks the association's discussion where needed, then marks
    /// the row untracked.
    async fn retire_discussion(&self, association: &Association) -> Result<(), ReconcileError> {
        let discussion = &association.discussion_id;
        let remote = self.ops.discussion_state(discussion).await?;
        if !remote.closed {
            self.ops.close_discussion(discussion).await?;
        }
        if !remote.locked {
            self.ops.lock_thread(discussion).await?;
        }
        self.store.mark_untracked(association).await?;
        Ok(())
    }

    /// Connects every open, eligible feature issue in every monitored
    /// repository.
    ///
    /// A failed Connect is counted and the sweep moves on. A failed listing
    /// aborts the sweep.
    #[instrument(skip(self))]
    pub async fn sync_unconnected_issues(&self) -> Result<SyncReport, ReconcileError> {
        let mut report = SyncReport::default();

        for repo in self.voting.monitored() {
            let mut cursor: Option<String> = None;
            loop {
                let page = self
                    .ops
                    .list_open_issues(repo, &FEATURE_LABELS, cursor.as_deref())
                    .await?;
                debug!(repo = %repo, count = page.issues.len(), "Fetched issue page");

                for issue in &page.issues {
                    report.scanned += 1;
                    if !issue.is_eligible_for_voting() {
                        report.skipped += 1;
                        continue;
                    }
                    match self.connect(repo, &issue.id, Some(issue), false).await {
                        Ok(ConnectOutcome::Connected(_)) => report.connected += 1,
                        Ok(ConnectOutcome::Skipped(_)) => report.skipped += 1,
                        Err(e) => {
                            report.failed += 1;
                            warn!(
                                repo = %repo,
                                issue = %issue.id,
                                error = %e,
                                "Connect failed during sync"
                            );
                        }
                    }
                }

                match page.next_cursor() {
                    Some(next) => cursor = Some(next.to_string()),
                    None => break,
                }
            }
        }

        info!(
            scanned = report.scanned,
            connected = report.connected,
            skipped = report.skipped,
            failed = report.failed,
            "Sync sweep finished"
        );
        Ok(report)
    }
}
