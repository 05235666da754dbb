//! # Repo-Sync HTTP Service
//!
//! HTTP server for receiving GitHub webhook deliveries and managing the
//! repositories whose webhooks this service owns.
//!
//! This service provides:
//! - `POST /webhooks/{name}`: signature-verified delivery endpoint per repository
//! - `PUT|GET|DELETE /api/repositories/{name}`: repository lifecycle with
//!   remote webhook reconciliation
//! - `GET /health`: liveness endpoint

pub mod config;
pub mod errors;

pub use config::{
    GitHubConfig, LoggingConfig, RepositoryDefinition, ServerConfig, ServiceConfig,
    WebhooksConfig,
};
pub use errors::{ApiHandlerError, ConfigError, ServiceError};

use axum::{
    extract::{DefaultBodyLimit, Path, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use github_webhook_sdk::webhook::{DELIVERY_ID_HEADER, EVENT_TYPE_HEADER, SIGNATURE_HEADER};
use github_webhook_sdk::GitHubClient;
use repo_sync_core::webhook::{WebhookRepository, WebhookRequest, WebhookResponse};
use repo_sync_core::{
    resolve_webhook_secret, JobQueue, Repository, RepositorySpec, RepositoryStore, SecretError,
    SecretStore, SecretValue,
};
use serde::Serialize;
use std::{collections::HashMap, future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, instrument, warn, Instrument};

const CORRELATION_ID_HEADER: &str = "x-correlation-id";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    /// GitHub API client used for webhook reconciliation
    pub github: Arc<dyn GitHubClient>,

    /// Repository definitions and their reconciled state
    pub repositories: Arc<dyn RepositoryStore>,

    /// Webhook secrets referenced by repositories
    pub secrets: Arc<dyn SecretStore>,

    /// Destination for jobs produced by deliveries
    pub jobs: Arc<dyn JobQueue>,

    reconcile_locks: ReconcileLocks,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        github: Arc<dyn GitHubClient>,
        repositories: Arc<dyn RepositoryStore>,
        secrets: Arc<dyn SecretStore>,
        jobs: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            github,
            repositories,
            secrets,
            jobs,
            reconcile_locks: ReconcileLocks::default(),
        }
    }

    fn webhook_repository(
        &self,
        repository: Repository,
        secret: Option<SecretValue>,
    ) -> Result<WebhookRepository, ApiHandlerError> {
        let webhook_url = self.config.webhooks.webhook_url(&repository.name);
        Ok(WebhookRepository::new(
            repository,
            webhook_url,
            self.github.clone(),
            secret,
        )?)
    }
}

/// One lock per repository name, held for a whole reconciliation.
#[derive(Clone, Default)]
struct ReconcileLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ReconcileLocks {
    async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .await
            .entry(name.to_string())
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}

// ============================================================================
// Repository lifecycle
// ============================================================================

/// Create or update a repository and reconcile its remote webhook.
///
/// A repository new to the store first adopts any webhook GitHub already
/// delivers to its URL and is otherwise reconciled with `on_create`; an
/// existing one goes through `on_update`. Returned patch operations are
/// applied to the store; a reconciliation that changes nothing leaves the
/// stored status untouched.
///
/// Reconciliations of the same repository never overlap: the read, the
/// GitHub calls and the patch all happen under the repository's lock.
#[instrument(skip(state, spec), fields(repository = %name))]
pub async fn apply_repository(
    state: &AppState,
    name: &str,
    spec: RepositorySpec,
) -> Result<Repository, ApiHandlerError> {
    let _guard = state.reconcile_locks.acquire(name).await;

    let existing = state.repositories.get(name).await?;
    let is_new = existing.is_none();

    let repository = match existing {
        Some(mut repository) => {
            repository.spec = spec;
            repository
        }
        None => Repository::new(name, spec),
    };

    let webhooks = state.webhook_repository(repository.clone(), None)?;
    state.repositories.put(repository.clone()).await?;

    let ops = if is_new {
        match webhooks.adopt_existing().await? {
            Some(ops) => ops,
            None => webhooks.on_create().await?,
        }
    } else {
        webhooks.on_update().await?
    };

    if ops.is_empty() {
        info!(created = is_new, "Repository stored, webhook unchanged");
        return Ok(repository);
    }

    let updated = state.repositories.apply_patch(name, &ops).await?;
    info!(
        created = is_new,
        webhook_id = updated.status.webhook.as_ref().map(|w| w.id),
        "Repository stored, webhook reconciled"
    );
    Ok(updated)
}

/// Delete a repository's remote webhook, then the repository and its secret.
#[instrument(skip(state), fields(repository = %name))]
pub async fn remove_repository(state: &AppState, name: &str) -> Result<(), ApiHandlerError> {
    let _guard = state.reconcile_locks.acquire(name).await;

    let repository = state
        .repositories
        .get(name)
        .await?
        .ok_or_else(|| ApiHandlerError::RepositoryNotFound {
            name: name.to_string(),
        })?;

    match state.webhook_repository(repository, None) {
        Ok(webhooks) => webhooks.on_delete().await?,
        Err(e) => warn!(error = %e, "Cannot address remote webhook, deleting locally only"),
    }

    state.repositories.delete(name).await?;
    info!("Repository deleted");
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_body_size;
    let timeout = Duration::from_secs(state.config.server.timeout_seconds);

    let webhook_routes = Router::new().route("/webhooks/{name}", post(handle_webhook));

    let health_routes = Router::new().route("/health", get(handle_health_check));

    let api_routes = Router::new().route(
        "/api/repositories/{name}",
        get(get_repository)
            .put(put_repository)
            .delete(delete_repository),
    );

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_body_size))
                .layer(TimeoutLayer::new(timeout))
                .layer(middleware::from_fn(correlation_id_middleware))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server and serve until SIGINT or SIGTERM.
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let server = state.config.server.clone();
    let app = create_router(state);

    let address = format!("{}:{}", server.host, server.port);
    let addr: SocketAddr = address.parse().map_err(|e| ServiceError::BindFailed {
        address: address.clone(),
        message: format!("invalid address: {}", e),
    })?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address,
            message: e.to_string(),
        })?;

    info!("Starting HTTP server on {}", addr);

    let drain_timeout = Duration::from_secs(server.shutdown_timeout_seconds);
    serve_until(listener, app, shutdown_signal(), drain_timeout).await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Serve `app` until `signal` completes, then let in-flight requests finish
/// for at most `drain_timeout`.
///
/// New connections are refused once the signal fires. Requests still running
/// when the timeout expires are dropped.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    drain_timeout: Duration,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, mut fired_rx) = tokio::sync::watch::channel(false);

    let shutdown = async move {
        signal.await;
        info!(
            timeout_secs = drain_timeout.as_secs(),
            "Draining in-flight requests"
        );
        let _ = fired_tx.send(true);
    };
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    };
    let drain_deadline = async move {
        let fired = fired_rx.wait_for(|fired| *fired).await.is_ok();
        if !fired {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server => result.map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?,
        _ = drain_deadline => {
            warn!(
                timeout_secs = drain_timeout.as_secs(),
                "Graceful shutdown timed out, dropping in-flight requests"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

// ============================================================================
// Webhook Handlers
// ============================================================================

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Handle a GitHub delivery for one repository.
///
/// The body is verified exactly as received. A dispatched job is enqueued
/// before the response is returned; the response status is the dispatch
/// outcome's code.
#[instrument(skip(state, headers, body), fields(repository = %name, delivery_id))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>), ApiHandlerError> {
    if let Some(delivery_id) = header_value(&headers, DELIVERY_ID_HEADER) {
        tracing::Span::current().record("delivery_id", delivery_id.as_str());
    }

    let event_type = header_value(&headers, EVENT_TYPE_HEADER)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiHandlerError::InvalidHeaders {
            message: format!("missing {} header", EVENT_TYPE_HEADER),
        })?;

    let repository = state
        .repositories
        .get(&name)
        .await?
        .ok_or_else(|| ApiHandlerError::RepositoryNotFound { name: name.clone() })?;

    // A dangling reference leaves nothing to verify against, like no secret at all.
    let secret = match resolve_webhook_secret(state.secrets.as_ref(), &repository.secure).await {
        Ok(secret) => secret,
        Err(SecretError::NotFound { name }) => {
            warn!(secret = %name, "Webhook secret reference has no stored value");
            None
        }
        Err(e) => return Err(e.into()),
    };
    let webhooks = state.webhook_repository(repository, secret)?;

    let request = WebhookRequest {
        event_type,
        signature: header_value(&headers, SIGNATURE_HEADER),
        body,
    };
    let response = webhooks.webhook(&request).await?;

    if let Some(job) = &response.job {
        state.jobs.enqueue(job.clone()).await?;
        info!(event = %request.event_type, "Delivery accepted, job enqueued");
    } else {
        info!(event = %request.event_type, code = response.code, "Delivery handled");
    }

    let status = StatusCode::from_u16(response.code).unwrap_or(StatusCode::OK);
    Ok((status, Json(response)))
}

// ============================================================================
// Repository Handlers
// ============================================================================

async fn put_repository(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(spec): Json<RepositorySpec>,
) -> Result<Json<Repository>, ApiHandlerError> {
    apply_repository(&state, &name, spec).await.map(Json)
}

async fn get_repository(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Repository>, ApiHandlerError> {
    let repository = state.repositories.get(&name).await?;
    repository
        .map(Json)
        .ok_or(ApiHandlerError::RepositoryNotFound { name })
}

async fn delete_repository(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiHandlerError> {
    remove_repository(&state, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Tag every request with a correlation ID.
///
/// Reuses the caller's `x-correlation-id` or assigns a fresh one, runs the
/// request inside a span carrying it and echoes it on the response. Request
/// completion itself is logged by the trace layer.
async fn correlation_id_middleware(request: Request, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
