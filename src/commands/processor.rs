//! Authorizes and executes bot commands.
//!
//! Nothing here returns an error. Every failure ends in a reply on the issue
//! (or, if even that fails, a log line), so a bad command can never stop the
//! worker.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::effects::{GitHubInterpreter, GitHubOps};
use crate::reconcile::{
    ConnectOutcome, DisconnectOutcome, ReconcileEngine, ReconcileError, SkipReason,
};
use crate::store::AssociationStore;
use crate::webhooks::IssueCommentEvent;

use super::parser::parse_command;
use super::types::Command;

/// Roles allowed to run commands on public repositories.
pub const DEFAULT_PRIVILEGED_ROLES: [&str; 2] = ["owner", "member"];

pub const UNAUTHORIZED_REPLY: &str = "你没有进行此操作的权限。 ";

pub const PING_REPLY: &str = "\n<img alt=\"流萤比心\" src=\"https://github.com/user-attachments/assets/cc7902f8-baa7-4a70-9fec-4792f401cdd4\" height=\"80px\"/>\n\nPong!";

pub const TRACK_REPLY: &str = "已为此 Issue 开启新的投票。";

pub const ALREADY_UNTRACKED_REPLY: &str = "此 Issue 当前没有进行中的投票。";

pub const UNTRACK_REPLY: &str = "已结束此 Issue 的投票。";

pub const FAILURE_REPLY: &str = "执行此命令时出现错误，请稍后再试。";

/// What happened to a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The comment carries no command.
    NoCommand,
    /// The commenter lacks a privileged role on a public repository.
    Unauthorized(Command),
    /// The command ran (or was unrecognized and ignored).
    Executed(Command),
    /// The command failed and the generic failure reply was attempted.
    Failed(Command),
}

/// Who may run commands, and under which name the bot is mentioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettings {
    pub bot_name: String,
    /// Lowercase `author_association` values.
    pub privileged_roles: Vec<String>,
}

impl CommandSettings {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            privileged_roles: DEFAULT_PRIVILEGED_ROLES
                .iter()
                .map(|r| r.to_string())
                .collect(),
        }
    }

    /// Private repositories are trusted wholesale.
    pub fn is_authorized(&self, event: &IssueCommentEvent) -> bool {
        event.repo.private
            || self
                .privileged_roles
                .iter()
                .any(|r| r.eq_ignore_ascii_case(&event.author_association))
    }
}

pub struct CommandProcessor<I, S> {
    engine: Arc<ReconcileEngine<I, S>>,
    ops: GitHubOps<I>,
    settings: CommandSettings,
}

impl<I, S> CommandProcessor<I, S>
where
    I: GitHubInterpreter,
    S: AssociationStore,
{
    pub fn new(
        engine: Arc<ReconcileEngine<I, S>>,
        ops: GitHubOps<I>,
        settings: CommandSettings,
    ) -> Self {
        Self {
            engine,
            ops,
            settings,
        }
    }

    #[instrument(skip_all, fields(repo = %event.repo.node_id, issue = %event.issue.number))]
    pub async fn process(&self, event: &IssueCommentEvent) -> CommandOutcome {
        let Some(command) = parse_command(&event.body, &self.settings.bot_name) else {
            return CommandOutcome::NoCommand;
        };
        info!(user = %event.author_login, command = %command, "Processing command");

        if !self.settings.is_authorized(event) {
            info!(
                user = %event.author_login,
                role = %event.author_association,
                "Rejected command from unprivileged user"
            );
            self.reply(event, UNAUTHORIZED_REPLY).await;
            return CommandOutcome::Unauthorized(command);
        }

        match self.execute(&command, event).await {
            Ok(()) => CommandOutcome::Executed(command),
            Err(e) => {
                error!(command = %command, error = %e, "Command failed");
                self.reply(event, FAILURE_REPLY).await;
                CommandOutcome::Failed(command)
            }
        }
    }

    async fn execute(
        &self,
        command: &Command,
        event: &IssueCommentEvent,
    ) -> Result<(), ReconcileError> {
        let repo = &event.repo.node_id;
        let issue = &event.issue.id;
        match command {
            Command::Ping => {
                self.post(event, PING_REPLY).await?;
            }
            Command::TrackVoting => match self.engine.connect(repo, issue, None, true).await? {
                ConnectOutcome::Connected(_) => self.post(event, TRACK_REPLY).await?,
                ConnectOutcome::Skipped(reason) => {
                    info!(?reason, "track_voting did nothing");
                }
            },
            Command::UntrackVoting => match self.engine.disconnect(repo, issue, None).await? {
                DisconnectOutcome::Disconnected(_) => self.post(event, UNTRACK_REPLY).await?,
                DisconnectOutcome::Skipped(SkipReason::UnmappedRepository) => {
                    info!("untrack_voting did nothing: repository not monitored");
                }
                DisconnectOutcome::Skipped(_) => self.post(event, ALREADY_UNTRACKED_REPLY).await?,
            },
            Command::Unrecognized(name) => {
                info!(command = %name, "Ignoring unrecognized command");
            }
        }
        Ok(())
    }

    /// Posts `text` addressed to the issue author.
    async fn post(&self, event: &IssueCommentEvent, text: &str) -> Result<(), ReconcileError> {
        self.ops
            .add_comment(&event.issue.id, address(&event.issue.author_login, text))
            .await?;
        Ok(())
    }

    async fn reply(&self, event: &IssueCommentEvent, text: &str) {
        if let Err(e) = self.post(event, text).await {
            warn!(error = %e, "Could not post command reply");
        }
    }
}

fn address(login: &str, text: &str) -> String {
    format!("@{login} {text}")
}
