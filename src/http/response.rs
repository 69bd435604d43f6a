//! Response handling and transformation.
//!
//! # Responsibilities
//! - Render an [`ExecutionResult`] as an HTTP response
//! - Strip hop-by-hop headers from upstream responses
//! - Render failures as a JSON error envelope
//!
//! # Design Decisions
//! - Success status, headers and body are otherwise passed through as-is
//! - Content-Length is recomputed by the server from the buffered body

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::transform::is_hop_by_hop;
use crate::workflow::types::{ExecutionResult, Failure};

pub const X_EXECUTION_ID: &str = "x-execution-id";

/// Render a workflow result for the listener.
pub fn render(result: ExecutionResult, execution_id: Option<Uuid>) -> Response {
    let mut response = match result {
        ExecutionResult::Success {
            status_code,
            headers,
            body,
        } => {
            let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut response = Response::new(Body::from(body));
            *response.status_mut() = status;

            let map = response.headers_mut();
            for (name, value) in headers {
                if is_hop_by_hop(&name) {
                    continue;
                }
                if let (Ok(name), Ok(value)) = (
                    HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_str(&value),
                ) {
                    map.append(name, value);
                }
            }
            response
        }
        ExecutionResult::Failure(failure) => failure_response(&failure),
    };

    if let Some(id) = execution_id {
        if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
            response.headers_mut().insert(X_EXECUTION_ID, value);
        }
    }
    response
}

/// JSON error envelope with the failure's status code.
pub fn failure_response(failure: &Failure) -> Response {
    let status =
        StatusCode::from_u16(failure.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(failure)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::FailureKind;
    use bytes::Bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_passthrough() {
        let response = render(
            ExecutionResult::Success {
                status_code: 201,
                headers: vec![
                    ("content-type".into(), "application/json".into()),
                    ("set-cookie".into(), "a=1".into()),
                    ("set-cookie".into(), "b=2".into()),
                    ("transfer-encoding".into(), "chunked".into()),
                    ("connection".into(), "close".into()),
                ],
                body: Bytes::from_static(br#"{"id":1}"#),
            },
            None,
        );

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
        assert!(response.headers().get("transfer-encoding").is_none());
        assert!(response.headers().get("connection").is_none());
        assert_eq!(body_json(response).await, serde_json::json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_failure_envelope() {
        let id = Uuid::new_v4();
        let response = render(
            Failure::new(FailureKind::UpstreamTimeout, 504, "slow").into(),
            Some(id),
        );

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(response.headers()[X_EXECUTION_ID], id.to_string().as_str());
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"kind": "UpstreamTimeout", "statusCode": 504, "message": "slow"})
        );
    }
}
