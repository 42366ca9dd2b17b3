use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use issue_voting_bot::auth::{CredentialCache, JwtSigner, OctocrabTokenExchange};
use issue_voting_bot::commands::CommandProcessor;
use issue_voting_bot::config::{Cli, Config};
use issue_voting_bot::effects::GitHubOps;
use issue_voting_bot::github::InstallationClient;
use issue_voting_bot::reconcile::ReconcileEngine;
use issue_voting_bot::release::ReleaseTracker;
use issue_voting_bot::server::{AppState, build_router};
use issue_voting_bot::store::SqliteAssociationStore;
use issue_voting_bot::webhooks::WebhookSecret;
use issue_voting_bot::worker::{Dispatcher, Worker, run_sync_schedule, task_queue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "issue_voting_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let store = SqliteAssociationStore::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path.display()))?;

    let signer = JwtSigner::from_pem_file(config.app_id, &config.private_key_path)
        .context("loading GitHub App private key")?;
    let tokens = Arc::new(CredentialCache::new(
        signer,
        OctocrabTokenExchange::new(config.organization.clone()),
    ));
    let ops = GitHubOps::new(Arc::new(InstallationClient::new(tokens)));

    let engine = Arc::new(ReconcileEngine::new(ops.clone(), store, config.voting()));
    let commands = CommandProcessor::new(engine.clone(), ops.clone(), config.command_settings());
    let dispatcher = Dispatcher::new(engine, commands, ReleaseTracker::new(ops));

    let shutdown = CancellationToken::new();
    let (queue, rx) = task_queue(config.queue_capacity);

    let worker = tokio::spawn(Worker::new(Arc::new(dispatcher)).run(rx, shutdown.clone()));
    let schedule = tokio::spawn(run_sync_schedule(
        queue.clone(),
        config.sync_schedule(),
        shutdown.clone(),
    ));

    let app = build_router(AppState::new(
        WebhookSecret::new(config.webhook_secret.clone()),
        queue,
    ));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(
        addr = %config.listen_addr,
        repositories = config.repositories.len(),
        "listening"
    );

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for Ctrl-C");
            }
            tracing::info!("shutting down");
            signal.cancel();
        })
        .await
        .context("serving HTTP")?;

    // Wait for the in-flight item, if any.
    shutdown.cancel();
    schedule.await.context("sync schedule task")?;
    let stats = worker.await.context("worker task")?;
    tracing::info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        panicked = stats.panicked,
        "stopped"
    );
    Ok(())
}
