//! Bot commands issued through issue comments.
//!
//! # Supported Commands
//!
//! - `@{bot_name} /ping` - Replies with a pong
//! - `@{bot_name} /track_voting` - Opens a new voting discussion for the issue
//! - `@{bot_name} /untrack_voting` - Ends voting for the issue
//!
//! On public repositories only owners and members may run commands; anyone
//! else gets a fixed refusal. Replies mention the issue author.
//!
//! # Example
//!
//! ```
//! use issue_voting_bot::commands::{parse_command, Command};
//!
//! let comment = "Looks popular.\n\n@classisland-bot /track_voting";
//! assert_eq!(parse_command(comment, "classisland-bot"), Some(Command::TrackVoting));
//! ```

mod parser;
mod processor;
mod types;

pub use parser::parse_command;
pub use processor::{
    CommandOutcome, CommandProcessor, CommandSettings, DEFAULT_PRIVILEGED_ROLES, FAILURE_REPLY,
    PING_REPLY, UNAUTHORIZED_REPLY,
};
pub use types::Command;
