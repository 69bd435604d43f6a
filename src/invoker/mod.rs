//! Outbound call execution.
//!
//! # Responsibilities
//! - Issue exactly one outbound call per invocation
//! - Bound the whole exchange (connect, send, body read) by a timeout
//! - Classify the outcome into a raw response or a typed error
//!
//! # Design Decisions
//! - No retries here; retry policy belongs to whoever calls the workflow
//! - Timeout errors are distinct from connection errors
//! - "Error status" is a configurable threshold (default 400)
//! - Cancellation is drop: dropping the call future releases the connection

pub mod http;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use http::HttpInvoker;

/// Default lowest status code treated as a remote error.
pub const DEFAULT_ERROR_STATUS_THRESHOLD: u16 = 400;

/// Fully resolved outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCallDescriptor {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, String>,
    pub body: Option<Bytes>,
}

impl OutboundCallDescriptor {
    /// Header map safe to log: credential headers are masked.
    pub fn redacted_headers(&self) -> BTreeMap<&str, &str> {
        self.headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect()
    }
}

/// Response as received from the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Ways an outbound call can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvokerError {
    /// The call did not complete within its timeout.
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure; the remote never produced a response.
    #[error("upstream transport error: {0}")]
    TransportError(String),

    /// The remote answered with an error status.
    #[error("upstream rejected the call with status {status_code}")]
    RemoteError { status_code: u16, body: Bytes },
}

/// Executes an outbound call descriptor.
#[async_trait]
pub trait OutboundInvoker: Send + Sync {
    async fn call(
        &self,
        descriptor: OutboundCallDescriptor,
        timeout: Duration,
    ) -> Result<RawResponse, InvokerError>;
}

#[async_trait]
impl<I: OutboundInvoker + ?Sized> OutboundInvoker for std::sync::Arc<I> {
    async fn call(
        &self,
        descriptor: OutboundCallDescriptor,
        timeout: Duration,
    ) -> Result<RawResponse, InvokerError> {
        (**self).call(descriptor, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_headers_mask_authorization() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc123".to_string());
        headers.insert("accept".to_string(), "application/json".to_string());
        let descriptor = OutboundCallDescriptor {
            method: "GET".into(),
            url: "http://example.com".into(),
            headers,
            query_params: BTreeMap::new(),
            body: None,
        };

        let redacted = descriptor.redacted_headers();
        assert_eq!(redacted["Authorization"], "<redacted>");
        assert_eq!(redacted["accept"], "application/json");
    }
}
