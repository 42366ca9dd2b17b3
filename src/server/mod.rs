//! HTTP server for the voting bot.
//!
//! # Endpoints
//!
//! - `POST /api/v1/github/webhook` - Accepts GitHub webhook deliveries (returns 202 Accepted)
//! - `GET /health` - Returns 200 with free queue slots if the server is running

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

use crate::webhooks::WebhookSecret;
use crate::worker::TaskQueue;

/// Path GitHub delivers webhooks to.
pub const WEBHOOK_PATH: &str = "/api/v1/github/webhook";

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    webhook_secret: WebhookSecret,
    queue: TaskQueue,
}

impl AppState {
    pub fn new(webhook_secret: WebhookSecret, queue: TaskQueue) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret,
                queue,
            }),
        }
    }

    pub fn webhook_secret(&self) -> &WebhookSecret {
        &self.inner.webhook_secret
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.inner.queue
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route(WEBHOOK_PATH, post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
