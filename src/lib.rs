//! Issue Voting Bot - a GitHub App that mirrors feature-request issues into
//! community voting discussions and tells issues when a release ships them.
//!
//! This library provides the domain types, the reconciliation engine and the
//! webhook pipeline; `main.rs` wires them together.

pub mod auth;
pub mod commands;
pub mod config;
pub mod effects;
pub mod github;
pub mod reconcile;
pub mod release;
pub mod server;
pub mod store;
pub mod types;
pub mod webhooks;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_utils;
