use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::store::CacheStats;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct InvalidateResult {
    /// Tenant that was targeted, or `None` for a full flush.
    pub tenant: Option<String>,
    pub removed: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn get_cache(State(state): State<AdminState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// `POST /admin/cache/invalidate[?tenant=<id>]`
pub async fn invalidate_cache(
    State(state): State<AdminState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<InvalidateResult> {
    match params.get("tenant") {
        Some(tenant) => {
            let removed = usize::from(state.cache.invalidate(tenant));
            Json(InvalidateResult {
                tenant: Some(tenant.clone()),
                removed,
            })
        }
        None => {
            let removed = state.cache.stats().entries;
            state.cache.invalidate_all();
            Json(InvalidateResult {
                tenant: None,
                removed,
            })
        }
    }
}
