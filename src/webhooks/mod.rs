//! Webhook handling for GitHub events.
//!
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Typed events for `issues`, `issue_comment`, `release` and `ping`
//! - Payload parsing

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{
    CommentAction, GitHubEvent, IssueAction, IssueCommentEvent, IssuesEvent, PingEvent, Release,
    ReleaseAction, ReleaseEvent, RepoRef,
};
pub use parser::{ParseError, parse_webhook};
pub use signature::{SignatureError, WebhookSecret, parse_signature_header};
