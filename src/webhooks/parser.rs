//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON into typed [`GitHubEvent`] values.
//!
//! 1. The event type comes from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types and actions we do not handle return `Ok(None)`
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CommentNodeId, IssueNodeId, IssueNumber, IssueSnapshot, IssueState, RepoNodeId};

use super::events::{
    CommentAction, GitHubEvent, IssueAction, IssueCommentEvent, IssuesEvent, PingEvent, Release,
    ReleaseAction, ReleaseEvent, RepoRef,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has an invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// * `Ok(Some(event))` - a known event type and action
/// * `Ok(None)` - an event type or action the bot ignores
/// * `Err(e)` - malformed payload or missing required fields
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "issues" => parse_issues(payload).map(|opt| opt.map(GitHubEvent::Issues)),
        "issue_comment" => parse_issue_comment(payload).map(|e| Some(GitHubEvent::IssueComment(e))),
        "release" => parse_release(payload).map(|opt| opt.map(GitHubEvent::Release)),
        "ping" => parse_ping(payload).map(|e| Some(GitHubEvent::Ping(e))),
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    node_id: String,
    full_name: String,
    #[serde(default)]
    private: bool,
}

impl From<RawRepository> for RepoRef {
    fn from(raw: RawRepository) -> Self {
        RepoRef {
            node_id: RepoNodeId(raw.node_id),
            full_name: raw.full_name,
            private: raw.private,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    node_id: String,
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    state: String,
    #[serde(default)]
    labels: Vec<RawLabel>,
    user: RawUser,
    state_reason: Option<String>,
}

impl RawIssue {
    fn into_snapshot(self) -> Result<(IssueSnapshot, Option<String>), ParseError> {
        let state = IssueState::parse(&self.state).ok_or_else(|| ParseError::InvalidField {
            field: "issue.state",
            value: self.state.clone(),
        })?;
        let snapshot = IssueSnapshot {
            id: IssueNodeId(self.node_id),
            number: IssueNumber(self.number),
            title: self.title,
            body: self.body.unwrap_or_default(),
            url: self.html_url,
            state,
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            author_login: self.user.login,
        };
        Ok((snapshot, self.state_reason))
    }
}

// ============================================================================
// issues event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssuesPayload {
    action: String,
    issue: RawIssue,
    label: Option<RawLabel>,
    repository: RawRepository,
}

fn parse_issues(payload: &[u8]) -> Result<Option<IssuesEvent>, ParseError> {
    let raw: RawIssuesPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "opened" => IssueAction::Opened,
        "edited" => IssueAction::Edited,
        "closed" => IssueAction::Closed,
        "reopened" => IssueAction::Reopened,
        "labeled" => IssueAction::Labeled,
        "unlabeled" => IssueAction::Unlabeled,
        // assigned, milestoned, pinned, transferred, ...
        _ => return Ok(None),
    };

    let (issue, state_reason) = raw.issue.into_snapshot()?;
    Ok(Some(IssuesEvent {
        repo: raw.repository.into(),
        action,
        issue,
        label: raw.label.map(|l| l.name),
        state_reason,
    }))
}

// ============================================================================
// issue_comment event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    node_id: String,
    body: Option<String>,
    user: RawUser,
    author_association: String,
}

fn parse_issue_comment(payload: &[u8]) -> Result<IssueCommentEvent, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "created" => CommentAction::Created,
        "edited" => CommentAction::Edited,
        "deleted" => CommentAction::Deleted,
        other => {
            return Err(ParseError::InvalidField {
                field: "action",
                value: other.to_string(),
            });
        }
    };

    let (issue, _) = raw.issue.into_snapshot()?;
    Ok(IssueCommentEvent {
        repo: raw.repository.into(),
        action,
        issue,
        comment_id: CommentNodeId(raw.comment.node_id),
        body: raw.comment.body.unwrap_or_default(),
        author_login: raw.comment.user.login,
        author_association: raw.comment.author_association.to_ascii_lowercase(),
    })
}

// ============================================================================
// release event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawReleasePayload {
    action: String,
    release: RawRelease,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    name: Option<String>,
    tag_name: String,
    body: Option<String>,
    #[serde(default)]
    prerelease: bool,
    html_url: String,
}

fn parse_release(payload: &[u8]) -> Result<Option<ReleaseEvent>, ParseError> {
    let raw: RawReleasePayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "published" => ReleaseAction::Published,
        "unpublished" => ReleaseAction::Unpublished,
        "created" => ReleaseAction::Created,
        "edited" => ReleaseAction::Edited,
        "deleted" => ReleaseAction::Deleted,
        "prereleased" => ReleaseAction::Prereleased,
        "released" => ReleaseAction::Released,
        _ => return Ok(None),
    };

    let name = raw
        .release
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| raw.release.tag_name.clone());

    Ok(Some(ReleaseEvent {
        repo: raw.repository.into(),
        action,
        release: Release {
            name,
            tag_name: raw.release.tag_name,
            body: raw.release.body.unwrap_or_default(),
            prerelease: raw.release.prerelease,
            html_url: raw.release.html_url,
        },
    }))
}

// ============================================================================
// ping event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPingPayload {
    zen: Option<String>,
    hook_id: Option<u64>,
}

fn parse_ping(payload: &[u8]) -> Result<PingEvent, ParseError> {
    let raw: RawPingPayload = serde_json::from_slice(payload)?;
    Ok(PingEvent {
        zen: raw.zen,
        hook_id: raw.hook_id,
    })
}
