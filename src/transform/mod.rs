//! Inbound request → outbound call descriptor.
//!
//! # Responsibilities
//! - Compose the upstream URL from the tenant base URL, a fixed prefix and
//!   the inbound resource path
//! - Copy query parameters verbatim
//! - Inject the tenant's bearer token, replacing any caller credential
//! - Pass method and body through unchanged
//!
//! # Design Decisions
//! - Pure: no I/O, no clock, ordered maps, so equal inputs give equal output
//! - Never fails; malformed values are passed through for the transport to
//!   reject

use std::collections::BTreeMap;

use crate::config::WorkflowConfig;
use crate::invoker::OutboundCallDescriptor;
use crate::store::TenantConfig;
use crate::workflow::types::InboundRequest;

/// Headers that describe the inbound hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "content-length",
    "host",
    "keep-alive",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub const AUTHORIZATION: &str = "Authorization";

/// Returns true if `name` is a hop-by-hop or framing header.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Builds outbound descriptors for one deployment.
#[derive(Debug, Clone)]
pub struct RequestTransformer {
    path_prefix: String,
    forward_headers: bool,
}

impl RequestTransformer {
    pub fn new(path_prefix: impl Into<String>, forward_headers: bool) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            forward_headers,
        }
    }

    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self::new(config.path_prefix.clone(), config.forward_headers)
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Map `request` onto the tenant's upstream.
    pub fn build(&self, request: InboundRequest, config: &TenantConfig) -> OutboundCallDescriptor {
        let path = format!("{}{}", self.path_prefix, request.resource_path);
        let url = combine_url(&config.base_url, &path);

        let mut headers: BTreeMap<String, String> = if self.forward_headers {
            request
                .headers
                .into_iter()
                .filter(|(name, _)| {
                    !is_hop_by_hop(name) && !name.eq_ignore_ascii_case(AUTHORIZATION)
                })
                .collect()
        } else {
            BTreeMap::new()
        };
        headers.insert(
            AUTHORIZATION.to_string(),
            format!("Bearer {}", config.auth_token),
        );

        OutboundCallDescriptor {
            method: request.http_method,
            url,
            headers,
            query_params: request.query_params,
            body: request.body,
        }
    }
}

impl Default for RequestTransformer {
    fn default() -> Self {
        Self::from_config(&WorkflowConfig::default())
    }
}

/// Join a base URL and a relative path with exactly one `/` between them.
pub fn combine_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
