//! Values flowing into and out of a workflow execution.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An inbound request as delivered by the listener.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboundRequest {
    pub http_method: String,
    pub resource_path: String,
    pub query_params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
}

impl InboundRequest {
    pub fn new(http_method: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            resource_path: resource_path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Failure categories of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Tenant configuration missing or unreadable.
    ConfigError,
    /// The inbound request could not be mapped to a tenant.
    InvalidRequest,
    UpstreamTimeout,
    UpstreamUnreachable,
    UpstreamRejected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ConfigError => "ConfigError",
            FailureKind::InvalidRequest => "InvalidRequest",
            FailureKind::UpstreamTimeout => "UpstreamTimeout",
            FailureKind::UpstreamUnreachable => "UpstreamUnreachable",
            FailureKind::UpstreamRejected => "UpstreamRejected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform error envelope returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub kind: FailureKind,
    pub status_code: u16,
    pub message: String,
    /// Structured error details recovered from an upstream body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl Failure {
    pub fn new(kind: FailureKind, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code,
            message: message.into(),
            errors: None,
        }
    }
}

/// Terminal value of one execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success {
        status_code: u16,
        headers: Vec<(String, String)>,
        body: Bytes,
    },
    Failure(Failure),
}

impl ExecutionResult {
    pub fn status_code(&self) -> u16 {
        match self {
            ExecutionResult::Success { status_code, .. } => *status_code,
            ExecutionResult::Failure(f) => f.status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ExecutionResult::Failure(f) => Some(f),
            ExecutionResult::Success { .. } => None,
        }
    }

    /// Label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ExecutionResult::Success { .. } => "success",
            ExecutionResult::Failure(f) => f.kind.as_str(),
        }
    }
}

impl From<Failure> for ExecutionResult {
    fn from(failure: Failure) -> Self {
        ExecutionResult::Failure(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_camel_case() {
        let failure = Failure::new(FailureKind::UpstreamRejected, 403, "forbidden");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "UpstreamRejected",
                "statusCode": 403,
                "message": "forbidden",
            })
        );
    }

    #[test]
    fn test_result_accessors() {
        let ok = ExecutionResult::Success {
            status_code: 201,
            headers: vec![],
            body: Bytes::from_static(b"{}"),
        };
        assert!(ok.is_success());
        assert_eq!(ok.status_code(), 201);
        assert_eq!(ok.outcome(), "success");

        let failed: ExecutionResult = Failure::new(FailureKind::UpstreamTimeout, 504, "slow").into();
        assert_eq!(failed.failure().unwrap().kind, FailureKind::UpstreamTimeout);
        assert_eq!(failed.outcome(), "UpstreamTimeout");
    }
}
