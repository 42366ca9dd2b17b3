//! Typed facade over [`GitHubInterpreter`].

use std::sync::Arc;

use tracing::debug;

use super::github::{DiscussionState, GitHubEffect, GitHubResponse, IssuePage};
use super::interpreter::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::types::{
    CategoryId, CommentNodeId, DiscussionNodeId, IssueNodeId, IssueSnapshot, IssueState, LabelId,
    RepoNodeId,
};

/// Issues fetched per listing page.
pub const PAGE_SIZE: usize = 100;

/// Remote operations used by the reconciliation engine, the command processor
/// and the release tracker.
///
/// Label operations take names and resolve them to ids on every call.
pub struct GitHubOps<I> {
    interpreter: Arc<I>,
}

impl<I> Clone for GitHubOps<I> {
    fn clone(&self) -> Self {
        Self {
            interpreter: Arc::clone(&self.interpreter),
        }
    }
}

impl<I: GitHubInterpreter> GitHubOps<I> {
    pub fn new(interpreter: Arc<I>) -> Self {
        Self { interpreter }
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    async fn run(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        debug!(effect = effect.name(), "Interpreting GitHub effect");
        self.interpreter.interpret(effect).await
    }

    pub async fn resolve_label_id(
        &self,
        repo: &RepoNodeId,
        name: &str,
    ) -> Result<LabelId, GitHubApiError> {
        let effect = GitHubEffect::ResolveLabelId {
            repo: repo.clone(),
            name: name.to_string(),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::LabelId(id) => Ok(id),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn resolve_discussion_category(
        &self,
        repo: &RepoNodeId,
        slug: &str,
    ) -> Result<CategoryId, GitHubApiError> {
        let effect = GitHubEffect::ResolveDiscussionCategory {
            repo: repo.clone(),
            slug: slug.to_string(),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::CategoryId(id) => Ok(id),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn add_label(
        &self,
        labelable: &IssueNodeId,
        name: &str,
        repo: &RepoNodeId,
    ) -> Result<(), GitHubApiError> {
        let label = self.resolve_label_id(repo, name).await?;
        let effect = GitHubEffect::AddLabels {
            labelable: labelable.clone(),
            label_ids: vec![label],
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::LabelsAdded => Ok(()),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn remove_label(
        &self,
        labelable: &IssueNodeId,
        name: &str,
        repo: &RepoNodeId,
    ) -> Result<(), GitHubApiError> {
        let label = self.resolve_label_id(repo, name).await?;
        let effect = GitHubEffect::RemoveLabels {
            labelable: labelable.clone(),
            label_ids: vec![label],
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::LabelsRemoved => Ok(()),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn add_comment(
        &self,
        subject: &IssueNodeId,
        body: impl Into<String>,
    ) -> Result<CommentNodeId, GitHubApiError> {
        let effect = GitHubEffect::AddComment {
            subject: subject.clone(),
            body: body.into(),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::CommentAdded { id } => Ok(id),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    /// Creates a discussion in the category with the given slug.
    ///
    /// Returns the new discussion's id and URL.
    pub async fn create_discussion(
        &self,
        repo: &RepoNodeId,
        category_slug: &str,
        title: &str,
        body: &str,
    ) -> Result<(DiscussionNodeId, String), GitHubApiError> {
        let category = self.resolve_discussion_category(repo, category_slug).await?;
        let effect = GitHubEffect::CreateDiscussion {
            repo: repo.clone(),
            category,
            title: title.to_string(),
            body: body.to_string(),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::DiscussionCreated { id, url } => Ok((id, url)),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn close_discussion(&self, id: &DiscussionNodeId) -> Result<(), GitHubApiError> {
        let effect = GitHubEffect::CloseDiscussion {
            discussion: id.clone(),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::DiscussionClosed => Ok(()),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn lock_thread(&self, id: &DiscussionNodeId) -> Result<(), GitHubApiError> {
        let effect = GitHubEffect::LockLockable {
            lockable: id.clone(),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::Locked => Ok(()),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn discussion_state(
        &self,
        id: &DiscussionNodeId,
    ) -> Result<DiscussionState, GitHubApiError> {
        let effect = GitHubEffect::GetDiscussionState {
            discussion: id.clone(),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::DiscussionState(state) => Ok(state),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    pub async fn get_issue(&self, id: &IssueNodeId) -> Result<IssueSnapshot, GitHubApiError> {
        let effect = GitHubEffect::GetIssue { issue: id.clone() };
        match self.run(effect.clone()).await? {
            GitHubResponse::Issue(issue) => Ok(issue),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }

    /// One page of open issues carrying any of `labels`.
    pub async fn list_open_issues(
        &self,
        repo: &RepoNodeId,
        labels: &[&str],
        after: Option<&str>,
    ) -> Result<IssuePage, GitHubApiError> {
        self.list_issues(repo, labels, &[IssueState::Open], after)
            .await
    }

    /// One page of issues carrying any of `labels`, in any of `states`.
    pub async fn list_issues(
        &self,
        repo: &RepoNodeId,
        labels: &[&str],
        states: &[IssueState],
        after: Option<&str>,
    ) -> Result<IssuePage, GitHubApiError> {
        let effect = GitHubEffect::ListIssues {
            repo: repo.clone(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            states: states.to_vec(),
            after: after.map(str::to_string),
        };
        match self.run(effect.clone()).await? {
            GitHubResponse::IssuePage(page) => Ok(page),
            _ => Err(GitHubApiError::unexpected(&effect)),
        }
    }
}
