//! Shared test utilities: issue builders, an in-memory GitHub and webhook
//! payload builders.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use crate::auth::AuthError;
use crate::effects::{
    DiscussionState, GitHubEffect, GitHubInterpreter, GitHubResponse, IssuePage, PAGE_SIZE,
};
use crate::github::GitHubApiError;
use crate::reconcile::VotingConfig;
use crate::types::{
    CategoryId, CommentNodeId, DiscussionNodeId, IssueNodeId, IssueNumber, IssueSnapshot,
    IssueState, LabelId, RepoNodeId,
};

/// Node id of the voting repository in tests.
pub const VOTING_REPO: &str = "R_votes";

/// Discussion category slug used for every monitored repository in tests.
pub const VOTING_CATEGORY: &str = "功能投票";

/// An open issue with the given labels.
pub fn issue(id: &str, number: u64, labels: &[&str]) -> IssueSnapshot {
    IssueSnapshot {
        id: IssueNodeId::from(id),
        number: IssueNumber(number),
        title: format!("Issue {number}"),
        body: format!("Body of issue {number}"),
        url: format!("https://github.com/ClassIsland/ClassIsland/issues/{number}"),
        state: IssueState::Open,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        author_login: "reporter".to_string(),
    }
}

/// Maps each repository to [`VOTING_CATEGORY`] in [`VOTING_REPO`].
pub fn voting_config(repos: &[&str]) -> VotingConfig {
    VotingConfig {
        voting_repository: RepoNodeId::from(VOTING_REPO),
        categories: repos
            .iter()
            .map(|r| (RepoNodeId::from(*r), VOTING_CATEGORY.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

// ─── FakeGitHub ───────────────────────────────────────────────────────────────

/// A discussion created through [`FakeGitHub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDiscussion {
    pub id: DiscussionNodeId,
    pub repo: RepoNodeId,
    pub category_slug: String,
    pub title: String,
    pub body: String,
    pub url: String,
    pub closed: bool,
    pub locked: bool,
}

#[derive(Default)]
struct FakeState {
    effects: Vec<GitHubEffect>,
    /// Insertion order is listing order.
    issues: Vec<(RepoNodeId, IssueSnapshot)>,
    discussions: Vec<FakeDiscussion>,
    comments: HashMap<IssueNodeId, Vec<String>>,
    failing: HashSet<String>,
    failing_comments: HashSet<IssueNodeId>,
    auth_broken: bool,
    page_sizes: Vec<usize>,
    next_id: u64,
}

impl FakeState {
    fn issue_mut(&mut self, id: &IssueNodeId) -> Result<&mut IssueSnapshot, GitHubApiError> {
        self.issues
            .iter_mut()
            .map(|(_, i)| i)
            .find(|i| &i.id == id)
            .ok_or_else(|| GitHubApiError::permanent(format!("issue {id} not found")))
    }

    fn discussion_mut(
        &mut self,
        id: &DiscussionNodeId,
    ) -> Result<&mut FakeDiscussion, GitHubApiError> {
        self.discussions
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| GitHubApiError::permanent(format!("discussion {id} not found")))
    }

    fn apply(&mut self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        self.effects.push(effect.clone());

        if self.auth_broken {
            return Err(GitHubApiError::auth(AuthError::Exchange(
                "Bad credentials".to_string(),
            )));
        }
        if self.failing.contains(effect.name()) {
            return Err(GitHubApiError::permanent(format!(
                "injected failure: {}",
                effect.name()
            )));
        }

        match effect {
            GitHubEffect::ResolveLabelId { name, .. } => {
                Ok(GitHubResponse::LabelId(LabelId(format!("label:{name}"))))
            }
            GitHubEffect::ResolveDiscussionCategory { slug, .. } => Ok(
                GitHubResponse::CategoryId(CategoryId(format!("category:{slug}"))),
            ),
            GitHubEffect::GetIssue { issue } => {
                Ok(GitHubResponse::Issue(self.issue_mut(&issue)?.clone()))
            }
            GitHubEffect::GetDiscussionState { discussion } => {
                let d = self.discussion_mut(&discussion)?;
                Ok(GitHubResponse::DiscussionState(DiscussionState {
                    closed: d.closed,
                    locked: d.locked,
                }))
            }
            GitHubEffect::ListIssues {
                repo,
                labels,
                states,
                after,
            } => {
                let matching: Vec<_> = self
                    .issues
                    .iter()
                    .filter(|(r, _)| *r == repo)
                    .map(|(_, i)| i)
                    .filter(|i| labels.is_empty() || labels.iter().any(|l| i.has_label(l)))
                    .filter(|i| states.is_empty() || states.contains(&i.state))
                    .cloned()
                    .collect();
                let offset = after.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
                let issues: Vec<_> = matching.iter().skip(offset).take(PAGE_SIZE).cloned().collect();
                let end = offset + issues.len();
                self.page_sizes.push(issues.len());
                Ok(GitHubResponse::IssuePage(IssuePage {
                    issues,
                    end_cursor: Some(end.to_string()),
                    has_next_page: end < matching.len(),
                }))
            }
            GitHubEffect::AddLabels {
                labelable,
                label_ids,
            } => {
                let issue = self.issue_mut(&labelable)?;
                for id in label_ids {
                    let name = label_name(&id);
                    if !issue.has_label(&name) {
                        issue.labels.push(name);
                    }
                }
                Ok(GitHubResponse::LabelsAdded)
            }
            GitHubEffect::RemoveLabels {
                labelable,
                label_ids,
            } => {
                let issue = self.issue_mut(&labelable)?;
                let names: Vec<_> = label_ids.iter().map(label_name).collect();
                issue.labels.retain(|l| !names.contains(l));
                Ok(GitHubResponse::LabelsRemoved)
            }
            GitHubEffect::AddComment { subject, body } => {
                if self.failing_comments.contains(&subject) {
                    return Err(GitHubApiError::permanent(format!(
                        "injected comment failure on {subject}"
                    )));
                }
                self.next_id += 1;
                let id = CommentNodeId(format!("IC_fake_{}", self.next_id));
                self.comments.entry(subject).or_default().push(body);
                Ok(GitHubResponse::CommentAdded { id })
            }
            GitHubEffect::CreateDiscussion {
                repo,
                category,
                title,
                body,
            } => {
                self.next_id += 1;
                let id = DiscussionNodeId(format!("D_{}", self.next_id));
                let url = format!("https://github.com/ClassIsland/voting/discussions/{id}");
                self.discussions.push(FakeDiscussion {
                    id: id.clone(),
                    repo,
                    category_slug: category
                        .as_str()
                        .trim_start_matches("category:")
                        .to_string(),
                    title,
                    body,
                    url: url.clone(),
                    closed: false,
                    locked: false,
                });
                Ok(GitHubResponse::DiscussionCreated { id, url })
            }
            GitHubEffect::CloseDiscussion { discussion } => {
                self.discussion_mut(&discussion)?.closed = true;
                Ok(GitHubResponse::DiscussionClosed)
            }
            GitHubEffect::LockLockable { lockable } => {
                self.discussion_mut(&lockable)?.locked = true;
                Ok(GitHubResponse::Locked)
            }
        }
    }
}

fn label_name(id: &LabelId) -> String {
    id.as_str().trim_start_matches("label:").to_string()
}

/// An in-memory GitHub that records every effect it interprets.
///
/// Labels resolve to `label:<name>` and categories to `category:<slug>`.
/// Listings page at [`PAGE_SIZE`] with the offset as cursor.
#[derive(Default)]
pub struct FakeGitHub {
    state: Mutex<FakeState>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repo_issue(&self, repo: &RepoNodeId, issue: IssueSnapshot) {
        self.state.lock().unwrap().issues.push((repo.clone(), issue));
    }

    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.state.lock().unwrap().effects.clone()
    }

    pub fn clear_effects(&self) {
        self.state.lock().unwrap().effects.clear();
    }

    /// Number of recorded effects with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .effects
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    /// True if any recorded effect changed remote state.
    pub fn mutated(&self) -> bool {
        self.state.lock().unwrap().effects.iter().any(|e| e.is_mutation())
    }

    pub fn issue(&self, id: &str) -> Option<IssueSnapshot> {
        let id = IssueNodeId::from(id);
        self.state
            .lock()
            .unwrap()
            .issues
            .iter()
            .find(|(_, i)| i.id == id)
            .map(|(_, i)| i.clone())
    }

    pub fn issue_labels(&self, id: &str) -> Vec<String> {
        self.issue(id).map(|i| i.labels).unwrap_or_default()
    }

    /// Bodies of the comments posted on an issue, oldest first.
    pub fn comments(&self, id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(&IssueNodeId::from(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn discussion(&self, id: &DiscussionNodeId) -> Option<FakeDiscussion> {
        self.state
            .lock()
            .unwrap()
            .discussions
            .iter()
            .find(|d| &d.id == id)
            .cloned()
    }

    pub fn discussion_count(&self) -> usize {
        self.state.lock().unwrap().discussions.len()
    }

    pub fn set_discussion_flags(&self, id: &DiscussionNodeId, closed: bool, locked: bool) {
        let mut state = self.state.lock().unwrap();
        let d = state.discussion_mut(id).unwrap();
        d.closed = closed;
        d.locked = locked;
    }

    /// Issue counts of each listing page served, in order.
    pub fn list_page_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().page_sizes.clone()
    }

    /// Makes every effect with this name fail permanently.
    pub fn fail_on(&self, effect_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(effect_name.to_string());
    }

    /// Makes comments on one issue fail.
    pub fn fail_comment_on(&self, issue: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_comments
            .insert(IssueNodeId::from(issue));
    }

    /// Makes every effect fail as if the installation token was unobtainable.
    pub fn fail_auth(&self) {
        self.state.lock().unwrap().auth_broken = true;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing.clear();
        state.failing_comments.clear();
        state.auth_broken = false;
    }
}

impl GitHubInterpreter for FakeGitHub {
    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        self.state.lock().unwrap().apply(effect)
    }
}

// ─── Webhook payloads ─────────────────────────────────────────────────────────

pub mod payloads {
    //! Minimal webhook bodies for the source repository `R_src` and issue #42.

    use serde_json::{Value, json};

    fn repository(private: bool) -> Value {
        json!({
            "node_id": "R_src",
            "full_name": "ClassIsland/ClassIsland",
            "private": private,
        })
    }

    fn issue(state: &str, labels: &[&str], state_reason: Option<&str>) -> Value {
        json!({
            "node_id": "I_42",
            "number": 42,
            "title": "Dark mode",
            "body": "Please add dark mode.",
            "html_url": "https://github.com/ClassIsland/ClassIsland/issues/42",
            "state": state,
            "state_reason": state_reason,
            "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>(),
            "user": { "login": "reporter" },
        })
    }

    /// An `issues` event.
    pub fn issues(
        action: &str,
        state: &str,
        labels: &[&str],
        label: Option<&str>,
        state_reason: Option<&str>,
    ) -> String {
        let mut body = json!({
            "action": action,
            "issue": issue(state, labels, state_reason),
            "repository": repository(false),
        });
        if let Some(name) = label {
            body["label"] = json!({ "name": name });
        }
        body.to_string()
    }

    /// An `issue_comment.created` event on open feature issue #42.
    pub fn comment(body: &str, association: &str, private: bool) -> String {
        json!({
            "action": "created",
            "comment": {
                "node_id": "IC_1",
                "body": body,
                "user": { "login": "commenter" },
                "author_association": association,
            },
            "issue": issue("open", &["新功能"], None),
            "repository": repository(private),
        })
        .to_string()
    }

    /// A `release` event.
    pub fn release(action: &str, tag: &str, body: &str, prerelease: bool) -> String {
        json!({
            "action": action,
            "release": {
                "name": tag,
                "tag_name": tag,
                "body": body,
                "prerelease": prerelease,
                "html_url": format!("https://github.com/ClassIsland/ClassIsland/releases/tag/{tag}"),
            },
            "repository": repository(false),
        })
        .to_string()
    }
}
