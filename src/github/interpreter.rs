//! GitHub effect interpreter backed by the GraphQL API.
//!
//! Every effect is one GraphQL document. Lookups that come back empty (an
//! unknown label, a node of the wrong type) are permanent errors.

use serde::Deserialize;
use serde_json::json;

use crate::auth::TokenSource;
use crate::effects::{DiscussionState, GitHubEffect, GitHubInterpreter, GitHubResponse, IssuePage};
use crate::types::{
    CategoryId, CommentNodeId, DiscussionNodeId, IssueNodeId, IssueNumber, IssueSnapshot,
    IssueState, LabelId, RepoNodeId,
};

use super::client::InstallationClient;
use super::error::GitHubApiError;

// ─── GraphQL Documents ────────────────────────────────────────────────────────

const LABEL_QUERY: &str = r#"
query($repo: ID!, $name: String!) {
    node(id: $repo) {
        ... on Repository { label(name: $name) { id } }
    }
}
"#;

const CATEGORY_QUERY: &str = r#"
query($repo: ID!, $slug: String!) {
    node(id: $repo) {
        ... on Repository { discussionCategory(slug: $slug) { id } }
    }
}
"#;

const ISSUE_QUERY: &str = r#"
query($id: ID!) {
    node(id: $id) {
        ... on Issue {
            id number title body url state
            author { login }
            labels(first: 100) { nodes { name } }
        }
    }
}
"#;

const DISCUSSION_STATE_QUERY: &str = r#"
query($id: ID!) {
    node(id: $id) {
        ... on Discussion { closed locked }
    }
}
"#;

const ISSUES_QUERY: &str = r#"
query($repo: ID!, $labels: [String!], $states: [IssueState!], $after: String) {
    node(id: $repo) {
        ... on Repository {
            issues(first: 100, labels: $labels, states: $states, after: $after) {
                pageInfo { endCursor hasNextPage }
                nodes {
                    id number title body url state
                    author { login }
                    labels(first: 100) { nodes { name } }
                }
            }
        }
    }
}
"#;

const ADD_LABELS_MUTATION: &str = r#"
mutation($labelable: ID!, $labels: [ID!]!) {
    addLabelsToLabelable(input: {labelableId: $labelable, labelIds: $labels}) { clientMutationId }
}
"#;

const REMOVE_LABELS_MUTATION: &str = r#"
mutation($labelable: ID!, $labels: [ID!]!) {
    removeLabelsFromLabelable(input: {labelableId: $labelable, labelIds: $labels}) { clientMutationId }
}
"#;

const ADD_COMMENT_MUTATION: &str = r#"
mutation($subject: ID!, $body: String!) {
    addComment(input: {subjectId: $subject, body: $body}) { commentEdge { node { id } } }
}
"#;

const CREATE_DISCUSSION_MUTATION: &str = r#"
mutation($repo: ID!, $category: ID!, $title: String!, $body: String!) {
    createDiscussion(input: {repositoryId: $repo, categoryId: $category, title: $title, body: $body}) {
        discussion { id url }
    }
}
"#;

const CLOSE_DISCUSSION_MUTATION: &str = r#"
mutation($id: ID!) {
    closeDiscussion(input: {discussionId: $id, reason: RESOLVED}) { discussion { id } }
}
"#;

const LOCK_MUTATION: &str = r#"
mutation($id: ID!) {
    lockLockable(input: {lockableId: $id}) { lockedRecord { locked } }
}
"#;

// ─── Response Shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NodeData<T> {
    node: Option<T>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RepoLabel {
    #[serde(default)]
    label: Option<IdOnly>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoCategory {
    #[serde(default)]
    discussion_category: Option<IdOnly>,
}

#[derive(Debug, Deserialize)]
struct Login {
    login: String,
}

#[derive(Debug, Deserialize)]
struct LabelName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LabelNodes {
    nodes: Vec<LabelName>,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    id: String,
    number: u64,
    title: String,
    body: Option<String>,
    url: String,
    state: String,
    author: Option<Login>,
    labels: Option<LabelNodes>,
}

impl IssueNode {
    fn into_snapshot(self) -> Result<IssueSnapshot, GitHubApiError> {
        let state = IssueState::parse(&self.state).ok_or_else(|| {
            GitHubApiError::permanent(format!("unknown issue state {:?}", self.state))
        })?;
        Ok(IssueSnapshot {
            id: IssueNodeId(self.id),
            number: IssueNumber(self.number),
            title: self.title,
            body: self.body.unwrap_or_default(),
            url: self.url,
            state,
            labels: self
                .labels
                .map(|l| l.nodes.into_iter().map(|n| n.name).collect())
                .unwrap_or_default(),
            // Deleted accounts come back as a null author.
            author_login: self
                .author
                .map(|a| a.login)
                .unwrap_or_else(|| "ghost".to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueConnection {
    page_info: PageInfo,
    nodes: Vec<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct RepoIssues {
    #[serde(default)]
    issues: Option<IssueConnection>,
}

#[derive(Debug, Deserialize)]
struct DiscussionFlags {
    #[serde(default)]
    closed: Option<bool>,
    #[serde(default)]
    locked: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentData {
    add_comment: AddCommentPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentPayload {
    comment_edge: CommentEdge,
}

#[derive(Debug, Deserialize)]
struct CommentEdge {
    node: IdOnly,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDiscussionData {
    create_discussion: CreateDiscussionPayload,
}

#[derive(Debug, Deserialize)]
struct CreateDiscussionPayload {
    discussion: CreatedDiscussion,
}

#[derive(Debug, Deserialize)]
struct CreatedDiscussion {
    id: String,
    url: String,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl<T: TokenSource> GitHubInterpreter for InstallationClient<T> {
    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        interpret_github_effect(self, effect).await
    }
}

/// Executes a single effect. Failures are returned as-is; nothing is retried.
pub async fn interpret_github_effect<T: TokenSource>(
    client: &InstallationClient<T>,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::ResolveLabelId { repo, name } => {
            let data: NodeData<RepoLabel> = client
                .graphql(LABEL_QUERY, json!({ "repo": repo, "name": name }))
                .await?;
            let label = data.node.and_then(|r| r.label).ok_or_else(|| {
                GitHubApiError::permanent(format!("label {:?} not found in {}", name, repo))
            })?;
            Ok(GitHubResponse::LabelId(LabelId(label.id)))
        }
        GitHubEffect::ResolveDiscussionCategory { repo, slug } => {
            let data: NodeData<RepoCategory> = client
                .graphql(CATEGORY_QUERY, json!({ "repo": repo, "slug": slug }))
                .await?;
            let category = data
                .node
                .and_then(|r| r.discussion_category)
                .ok_or_else(|| {
                    GitHubApiError::permanent(format!(
                        "discussion category {:?} not found in {}",
                        slug, repo
                    ))
                })?;
            Ok(GitHubResponse::CategoryId(CategoryId(category.id)))
        }
        GitHubEffect::GetIssue { issue } => {
            let data: NodeData<IssueNode> =
                client.graphql(ISSUE_QUERY, json!({ "id": issue })).await?;
            let node = data
                .node
                .ok_or_else(|| GitHubApiError::permanent(format!("issue {} not found", issue)))?;
            Ok(GitHubResponse::Issue(node.into_snapshot()?))
        }
        GitHubEffect::GetDiscussionState { discussion } => {
            let data: NodeData<DiscussionFlags> = client
                .graphql(DISCUSSION_STATE_QUERY, json!({ "id": discussion }))
                .await?;
            discussion_state(&discussion, data).map(GitHubResponse::DiscussionState)
        }
        GitHubEffect::ListIssues {
            repo,
            labels,
            states,
            after,
        } => {
            let data: NodeData<RepoIssues> = client
                .graphql(ISSUES_QUERY, list_issues_variables(&repo, &labels, &states, after))
                .await?;
            issue_page(&repo, data).map(GitHubResponse::IssuePage)
        }
        GitHubEffect::AddLabels {
            labelable,
            label_ids,
        } => {
            client
                .graphql::<serde_json::Value>(
                    ADD_LABELS_MUTATION,
                    json!({ "labelable": labelable, "labels": label_ids }),
                )
                .await?;
            Ok(GitHubResponse::LabelsAdded)
        }
        GitHubEffect::RemoveLabels {
            labelable,
            label_ids,
        } => {
            client
                .graphql::<serde_json::Value>(
                    REMOVE_LABELS_MUTATION,
                    json!({ "labelable": labelable, "labels": label_ids }),
                )
                .await?;
            Ok(GitHubResponse::LabelsRemoved)
        }
        GitHubEffect::AddComment { subject, body } => {
            let data: AddCommentData = client
                .graphql(
                    ADD_COMMENT_MUTATION,
                    json!({ "subject": subject, "body": body }),
                )
                .await?;
            Ok(GitHubResponse::CommentAdded {
                id: CommentNodeId(data.add_comment.comment_edge.node.id),
            })
        }
        GitHubEffect::CreateDiscussion {
            repo,
            category,
            title,
            body,
        } => {
            let data: CreateDiscussionData = client
                .graphql(
                    CREATE_DISCUSSION_MUTATION,
                    json!({ "repo": repo, "category": category, "title": title, "body": body }),
                )
                .await?;
            let created = data.create_discussion.discussion;
            Ok(GitHubResponse::DiscussionCreated {
                id: DiscussionNodeId(created.id),
                url: created.url,
            })
        }
        GitHubEffect::CloseDiscussion { discussion } => {
            client
                .graphql::<serde_json::Value>(
                    CLOSE_DISCUSSION_MUTATION,
                    json!({ "id": discussion }),
                )
                .await?;
            Ok(GitHubResponse::DiscussionClosed)
        }
        GitHubEffect::LockLockable { lockable } => {
            client
                .graphql::<serde_json::Value>(LOCK_MUTATION, json!({ "id": lockable }))
                .await?;
            Ok(GitHubResponse::Locked)
        }
    }
}

/// GraphQL's `IssueState` enum is upper case. An empty filter is sent as
/// `null` so every state matches.
fn list_issues_variables(
    repo: &RepoNodeId,
    labels: &[String],
    states: &[IssueState],
    after: Option<String>,
) -> serde_json::Value {
    let states: Option<Vec<&str>> = (!states.is_empty()).then(|| {
        states
            .iter()
            .map(|s| match s {
                IssueState::Open => "OPEN",
                IssueState::Closed => "CLOSED",
            })
            .collect()
    });
    let labels: Option<&[String]> = (!labels.is_empty()).then_some(labels);
    json!({
        "repo": repo,
        "labels": labels,
        "states": states,
        "after": after,
    })
}

fn issue_page(repo: &RepoNodeId, data: NodeData<RepoIssues>) -> Result<IssuePage, GitHubApiError> {
    let connection = data
        .node
        .and_then(|r| r.issues)
        .ok_or_else(|| GitHubApiError::permanent(format!("repository {} not found", repo)))?;
    let issues = connection
        .nodes
        .into_iter()
        .map(IssueNode::into_snapshot)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(IssuePage {
        issues,
        end_cursor: connection.page_info.end_cursor,
        has_next_page: connection.page_info.has_next_page,
    })
}

fn discussion_state(
    id: &DiscussionNodeId,
    data: NodeData<DiscussionFlags>,
) -> Result<DiscussionState, GitHubApiError> {
    match data.node {
        Some(DiscussionFlags {
            closed: Some(closed),
            locked: Some(locked),
        }) => Ok(DiscussionState { closed, locked }),
        _ => Err(GitHubApiError::permanent(format!(
            "discussion {} not found",
            id
        ))),
    }
}
