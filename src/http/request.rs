//! Request handling and transformation.
//!
//! # Responsibilities
//! - Request ID generation and propagation (UUID v4, `x-request-id`)
//! - Extract the tenant id from the query string
//! - Convert the HTTP request into an [`InboundRequest`]
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Header values that are not valid UTF-8 are decoded lossily rather than
//!   dropped
//! - Repeated query keys collapse to the last value

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::request::Parts;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::workflow::types::InboundRequest;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer assigning a UUID `x-request-id` to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// The request id assigned to `parts`, if any.
pub fn request_id(parts: &Parts) -> &str {
    parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Decode a raw query string into ordered pairs.
pub fn parse_query(query: Option<&str>) -> BTreeMap<String, String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// The tenant id carried by `param`, if present and non-blank.
pub fn tenant_id<'a>(query: &'a BTreeMap<String, String>, param: &str) -> Option<&'a str> {
    query
        .get(param)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Build the workflow input from request parts, a decoded query and the body.
pub fn inbound_from_parts(
    parts: &Parts,
    query_params: BTreeMap<String, String>,
    body: Bytes,
) -> InboundRequest {
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    InboundRequest {
        http_method: parts.method.as_str().to_string(),
        resource_path: parts.uri.path().to_string(),
        query_params,
        headers,
        body: if body.is_empty() { None } else { Some(body) },
    }
}
