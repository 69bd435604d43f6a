//! Admin API: status and tenant cache control.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::lifecycle::startup::TenantCache;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub cache: Arc<TenantCache>,
    pub api_key: Arc<str>,
    pub started_at: Instant,
}

pub fn router(cache: Arc<TenantCache>, api_key: &str) -> Router {
    let state = AdminState {
        cache,
        api_key: Arc::from(api_key),
        started_at: Instant::now(),
    };

    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache))
        .route("/admin/cache/invalidate", post(invalidate_cache))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
