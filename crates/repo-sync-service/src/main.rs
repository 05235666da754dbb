//! # Repo-Sync Service
//!
//! Binary entry point for the repo-sync HTTP service.
//!
//! This executable:
//! - Loads configuration from files and environment
//! - Initializes logging
//! - Builds the GitHub client, stores and job queue
//! - Reconciles every configured repository
//! - Starts the HTTP server from repo-sync-api

mod seed;
mod settings;

use anyhow::Context;
use github_webhook_sdk::{ClientConfig, RestGitHubClient};
use repo_sync_api::{start_server, AppState, LoggingConfig, ServiceConfig};
use repo_sync_core::{InMemoryJobQueue, InMemoryRepositoryStore, InMemorySecretStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for configuration that cannot be loaded or is invalid.
const EXIT_CONFIG: i32 = 3;

fn init_logging(logging: &LoggingConfig) {
    let level = &logging.level;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "repo_sync_service={level},repo_sync_api={level},repo_sync_core={level},github_webhook_sdk={level},tower_http=debug"
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_config() -> ServiceConfig {
    let explicit_path = settings::explicit_config_path();

    let config = match settings::load(explicit_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LoggingConfig::default());
            error!(error = %e, "Failed to load service configuration; aborting");
            std::process::exit(EXIT_CONFIG);
        }
    };

    init_logging(&config.logging);
    if let Some(path) = explicit_path {
        info!(path = %path, "Loaded configuration from explicit path");
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(EXIT_CONFIG);
    }

    config
}

fn build_github_client(config: &ServiceConfig) -> anyhow::Result<RestGitHubClient> {
    let client_config = ClientConfig::default()
        .with_github_api_url(&config.github.api_url)
        .with_user_agent(&config.github.user_agent)
        .with_timeout(Duration::from_secs(config.github.timeout_seconds));

    let mut builder = RestGitHubClient::builder().config(client_config);
    if let Some(token) = &config.github.token {
        builder = builder.token(token);
    }

    builder.build().context("failed to build GitHub client")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config();

    info!("Starting repo-sync service");

    if config.webhooks.public_base_url.is_none() {
        info!("No webhooks.public_base_url configured; remote webhooks will not be managed");
    }

    let github = match build_github_client(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = ?e, "Cannot create GitHub client; aborting");
            std::process::exit(EXIT_CONFIG);
        }
    };

    let secrets = Arc::new(InMemorySecretStore::new());
    let repositories = Arc::new(InMemoryRepositoryStore::new(secrets.clone()));
    let jobs = Arc::new(InMemoryJobQueue::new());
    let definitions = config.repositories.clone();

    let state = AppState::new(config, github, repositories, secrets, jobs);

    let summary = seed::seed_repositories(&state, &definitions).await;
    info!(
        applied = summary.applied,
        failed = summary.failed,
        "Configured repositories reconciled"
    );

    start_server(state)
        .await
        .context("HTTP server terminated with an error")?;

    Ok(())
}
