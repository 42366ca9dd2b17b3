//! Command types for `@classisland-bot /command` comments.

use std::fmt;

/// A parsed bot command from an issue comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check: `@bot /ping`
    Ping,

    /// Opens a new voting discussion even if one existed before:
    /// `@bot /track_voting`
    TrackVoting,

    /// Ends voting for the issue: `@bot /untrack_voting`
    UntrackVoting,

    /// Any other `/word` after the mention. Still subject to authorization,
    /// but executes nothing.
    Unrecognized(String),
}

impl Command {
    pub(super) fn from_name(name: &str) -> Self {
        match name {
            "ping" => Command::Ping,
            "track_voting" => Command::TrackVoting,
            "untrack_voting" => Command::UntrackVoting,
            other => Command::Unrecognized(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Ping => "ping",
            Command::TrackVoting => "track_voting",
            Command::UntrackVoting => "untrack_voting",
            Command::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}
