//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the workflow handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Resolve the tenant id and hand the request to the workflow executor
//! - Keep the tenant cache in step with the tenants file
//! - Run the admin API alongside the proxy listener

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::admin;
use crate::config::watcher::TenantsWatcher;
use crate::config::ProxyConfig;
use crate::http::request::{
    inbound_from_parts, parse_query, propagate_request_id_layer, request_id,
    set_request_id_layer, tenant_id, X_REQUEST_ID,
};
use crate::http::response::{failure_response, render};
use crate::invoker::{HttpInvoker, OutboundInvoker};
use crate::lifecycle::startup::{build_store, TenantCache};
use crate::observability::metrics;
use crate::store::ConfigStore;
use crate::workflow::{Failure, FailureKind, WorkflowExecutor};

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build outbound client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<WorkflowExecutor>,
    pub tenant_query_param: Arc<str>,
    pub max_body_bytes: usize,
}

/// HTTP server for the tenant proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    cache: Arc<TenantCache>,
}

impl HttpServer {
    /// Create a new HTTP server with the reqwest transport.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let invoker = HttpInvoker::new(config.workflow.error_status_threshold)?;
        Ok(Self::with_invoker(config, Arc::new(invoker)))
    }

    /// Create a server that sends outbound calls through `invoker`.
    pub fn with_invoker(config: ProxyConfig, invoker: Arc<dyn OutboundInvoker>) -> Self {
        let cache = build_store(&config.tenants);
        let store: Arc<dyn ConfigStore> = cache.clone();
        let executor = Arc::new(WorkflowExecutor::new(store, invoker, &config.workflow));

        let state = AppState {
            executor,
            tenant_query_param: Arc::from(config.workflow.tenant_query_param.as_str()),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(state);
        Self {
            router,
            config,
            cache,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.tenants.watch {
            if let Some(path) = self.config.tenants.file.clone() {
                spawn_tenants_watcher(path, self.cache.clone(), shutdown.resubscribe());
            }
        }

        if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            let admin_router = admin::router(self.cache.clone(), &self.config.admin.api_key);
            let mut admin_shutdown = shutdown.resubscribe();
            tracing::info!(address = %self.config.admin.bind_address, "Admin API starting");
            tokio::spawn(async move {
                let result = axum::serve(admin_listener, admin_router)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Admin API stopped with error");
                }
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The request router, for serving without a listener (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn cache(&self) -> Arc<TenantCache> {
        self.cache.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Span for one inbound request; execution spans nest under it.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}

/// Render a rejection that never reached the executor, and count it.
fn reject(failure: Failure, started: Instant) -> Response {
    metrics::record_execution(failure.kind.as_str(), failure.status_code, started.elapsed());
    failure_response(&failure)
}

/// Resolve the tenant and run one workflow execution.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts).to_string();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected request body");
            return reject(
                Failure::new(
                    FailureKind::InvalidRequest,
                    413,
                    format!("request body exceeds {} bytes", state.max_body_bytes),
                ),
                started,
            );
        }
    };

    let query = parse_query(parts.uri.query());
    let tenant = match tenant_id(&query, &state.tenant_query_param) {
        Some(t) => t.to_string(),
        None => {
            tracing::warn!(
                request_id = %request_id,
                param = %state.tenant_query_param,
                "Missing tenant query parameter"
            );
            return reject(
                Failure::new(
                    FailureKind::InvalidRequest,
                    400,
                    format!(
                        "missing required query parameter '{}'",
                        state.tenant_query_param
                    ),
                ),
                started,
            );
        }
    };

    tracing::debug!(
        request_id = %request_id,
        tenant_id = %tenant,
        method = %parts.method,
        path = %parts.uri.path(),
        "Executing workflow"
    );

    let inbound = inbound_from_parts(&parts, query, body);
    let outcome = state.executor.execute(&tenant, inbound).await;
    render(outcome.result, Some(outcome.execution_id))
}

/// Invalidate the tenant cache whenever the tenants file changes.
fn spawn_tenants_watcher(
    path: PathBuf,
    cache: Arc<TenantCache>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let (watcher, mut updates) = TenantsWatcher::new(&path);
    let handle = match watcher.run() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to start tenants watcher");
            return;
        }
    };

    tokio::spawn(async move {
        // Dropping the handle stops the OS watch.
        let _handle = handle;
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(records) => {
                        tracing::info!(tenants = records.len(), "Tenants file reloaded");
                        cache.invalidate_all();
                    }
                    None => break,
                },
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!("Tenants watcher stopped");
    });
}
