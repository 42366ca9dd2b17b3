//! Configuration loading.
//!
//! Settings come from a TOML file. The two secrets-adjacent settings, the
//! webhook secret and the private key path, can also be given as flags or
//! environment variables, which win over the file.
//!
//! ```toml
//! listen_addr = "0.0.0.0:3000"
//! database_path = "voting-bot.db"
//! bot_name = "classisland-bot"
//! app_id = 123456
//! organization = "ClassIsland"
//! private_key_path = "/etc/voting-bot/app.pem"
//! voting_repository = "R_kgDOvotes"
//!
//! [repositories]
//! R_kgDOsource = "功能投票"
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::commands::{CommandSettings, DEFAULT_PRIVILEGED_ROLES};
use crate::reconcile::VotingConfig;
use crate::types::RepoNodeId;
use crate::worker::{DEFAULT_QUEUE_CAPACITY, DEFAULT_SYNC_INTERVAL_MINS, SyncSchedule};

pub const DEFAULT_CONFIG_PATH: &str = "voting-bot.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "issue-voting-bot", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Webhook shared secret. Overrides `webhook_secret` in the file.
    #[arg(long, env = "VOTING_BOT_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// GitHub App private key (PEM). Overrides `private_key_path` in the file.
    #[arg(long, env = "VOTING_BOT_PRIVATE_KEY")]
    pub private_key_path: Option<PathBuf>,
}

/// The file as written, before defaults are checked.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    listen_addr: SocketAddr,
    database_path: PathBuf,
    queue_capacity: usize,
    bot_name: String,
    app_id: Option<u64>,
    organization: Option<String>,
    private_key_path: Option<PathBuf>,
    webhook_secret: Option<String>,
    voting_repository: Option<String>,
    sync_interval_mins: u64,
    privileged_roles: Vec<String>,
    repositories: BTreeMap<String, String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_path: PathBuf::from("voting-bot.db"),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            bot_name: "classisland-bot".to_string(),
            app_id: None,
            organization: None,
            private_key_path: None,
            webhook_secret: None,
            voting_repository: None,
            sync_interval_mins: DEFAULT_SYNC_INTERVAL_MINS,
            privileged_roles: DEFAULT_PRIVILEGED_ROLES
                .iter()
                .map(|r| r.to_string())
                .collect(),
            repositories: BTreeMap::new(),
        }
    }
}

/// Validated runtime configuration.
#[derive(Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_path: PathBuf,
    pub queue_capacity: usize,
    pub bot_name: String,
    pub app_id: u64,
    /// Account the GitHub App is installed on.
    pub organization: String,
    pub private_key_path: PathBuf,
    pub webhook_secret: SecretString,
    pub voting_repository: RepoNodeId,
    pub sync_interval_mins: u64,
    /// Lowercase.
    pub privileged_roles: Vec<String>,
    /// Monitored repository → voting category slug.
    pub repositories: BTreeMap<RepoNodeId, String>,
}

impl Config {
    /// Reads the file named by `cli.config` and applies the CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let content = read(&cli.config)?;
        Self::from_toml(&content, cli)
    }

    pub fn from_toml(content: &str, cli: &Cli) -> Result<Self, ConfigError> {
        let mut file: FileConfig = toml::from_str(content)?;
        if let Some(secret) = &cli.webhook_secret {
            file.webhook_secret = Some(secret.clone());
        }
        if let Some(path) = &cli.private_key_path {
            file.private_key_path = Some(path.clone());
        }
        Self::validate(file)
    }

    fn validate(file: FileConfig) -> Result<Self, ConfigError> {
        if file.queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "queue_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if file.bot_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "bot_name",
                reason: "must not be empty".to_string(),
            });
        }
        let app_id = file.app_id.ok_or(ConfigError::Missing("app_id"))?;
        let organization = non_empty(file.organization, "organization")?;
        let private_key_path = file
            .private_key_path
            .ok_or(ConfigError::Missing("private_key_path"))?;
        let webhook_secret = non_empty(file.webhook_secret, "webhook_secret")?;
        let voting_repository = non_empty(file.voting_repository, "voting_repository")?;

        if file.repositories.is_empty() {
            return Err(ConfigError::Invalid {
                field: "repositories",
                reason: "at least one monitored repository is required".to_string(),
            });
        }
        if let Some((repo, _)) = file.repositories.iter().find(|(_, slug)| slug.trim().is_empty())
        {
            return Err(ConfigError::Invalid {
                field: "repositories",
                reason: format!("empty category slug for {repo}"),
            });
        }

        Ok(Config {
            listen_addr: file.listen_addr,
            database_path: file.database_path,
            queue_capacity: file.queue_capacity,
            bot_name: file.bot_name,
            app_id,
            organization,
            private_key_path,
            webhook_secret: SecretString::from(webhook_secret),
            voting_repository: RepoNodeId::from(voting_repository),
            sync_interval_mins: file.sync_interval_mins,
            privileged_roles: file
                .privileged_roles
                .into_iter()
                .map(|r| r.to_ascii_lowercase())
                .collect(),
            repositories: file
                .repositories
                .into_iter()
                .map(|(repo, slug)| (RepoNodeId::from(repo), slug))
                .collect(),
        })
    }

    pub fn voting(&self) -> VotingConfig {
        VotingConfig {
            voting_repository: self.voting_repository.clone(),
            categories: self.repositories.clone(),
        }
    }

    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings {
            bot_name: self.bot_name.clone(),
            privileged_roles: self.privileged_roles.clone(),
        }
    }

    pub fn sync_schedule(&self) -> SyncSchedule {
        SyncSchedule::from_minutes(self.sync_interval_mins)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        }),
        None => Err(ConfigError::Missing(field)),
    }
}
