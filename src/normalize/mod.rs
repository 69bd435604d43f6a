//! Invoker failure classification.
//!
//! | InvokerError   | status  | kind                  |
//! |----------------|---------|-----------------------|
//! | Timeout        | 504     | `UpstreamTimeout`     |
//! | TransportError | 502     | `UpstreamUnreachable` |
//! | RemoteError    | as sent | `UpstreamRejected`    |
//!
//! Upstream error bodies are parsed best-effort: structured JSON yields its
//! message (unwrapping JSON that was encoded into a string member), anything
//! else is returned as the raw text.

use serde_json::Value;

use crate::invoker::InvokerError;
use crate::workflow::types::{Failure, FailureKind};

pub const TIMEOUT_MESSAGE: &str = "Proxied endpoint did not respond in a timely manner";

/// Keys searched, in order, for an error message.
const MESSAGE_KEYS: &[&str] = &["message", "errorMessage", "error"];

/// How many times a string member holding JSON is unwrapped.
const MAX_NESTING: usize = 4;

/// Classify an invoker error into the uniform failure envelope.
pub fn classify(error: InvokerError) -> Failure {
    match error {
        InvokerError::Timeout(_) => Failure::new(FailureKind::UpstreamTimeout, 504, TIMEOUT_MESSAGE),
        InvokerError::TransportError(reason) => Failure::new(
            FailureKind::UpstreamUnreachable,
            502,
            format!("Proxied endpoint could not be reached: {}", reason),
        ),
        InvokerError::RemoteError { status_code, body } => {
            let text = String::from_utf8_lossy(&body);
            let parsed = parse_error_body(&text);
            Failure {
                kind: FailureKind::UpstreamRejected,
                status_code,
                message: parsed.message.unwrap_or_else(|| text.into_owned()),
                errors: parsed.errors,
            }
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct ParsedBody {
    message: Option<String>,
    errors: Option<Value>,
}

fn parse_error_body(text: &str) -> ParsedBody {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => extract(&value, 0),
        Err(_) => ParsedBody::default(),
    }
}

fn extract(value: &Value, depth: usize) -> ParsedBody {
    match value {
        Value::String(s) => {
            // Double-encoded payload: a JSON document inside a string.
            if depth < MAX_NESTING {
                if let Ok(inner @ (Value::Object(_) | Value::String(_))) =
                    serde_json::from_str::<Value>(s.trim())
                {
                    let parsed = extract(&inner, depth + 1);
                    if parsed.message.is_some() || parsed.errors.is_some() {
                        return parsed;
                    }
                }
            }
            ParsedBody {
                message: Some(s.clone()),
                errors: None,
            }
        }
        Value::Object(map) => {
            let errors = map.get("errors").filter(|v| !v.is_null()).cloned();

            for key in MESSAGE_KEYS {
                match map.get(*key) {
                    Some(Value::String(s)) => {
                        let inner = extract(&Value::String(s.clone()), depth);
                        return ParsedBody {
                            message: inner.message,
                            errors: errors.or(inner.errors),
                        };
                    }
                    Some(nested @ Value::Object(_)) if depth < MAX_NESTING => {
                        let inner = extract(nested, depth + 1);
                        if inner.message.is_some() {
                            return ParsedBody {
                                message: inner.message,
                                errors: errors.or(inner.errors),
                            };
                        }
                    }
                    _ => {}
                }
            }

            // A cause wrapper carries the real payload one level down.
            if let Some(cause) = map.get("Cause").or_else(|| map.get("cause")) {
                if depth < MAX_NESTING {
                    let inner = extract(cause, depth + 1);
                    if inner.message.is_some() {
                        return ParsedBody {
                            message: inner.message,
                            errors: errors.or(inner.errors),
                        };
                    }
                }
            }

            ParsedBody {
                message: errors.as_ref().map(|e| e.to_string()),
                errors,
            }
        }
        _ => ParsedBody::default(),
    }
}
