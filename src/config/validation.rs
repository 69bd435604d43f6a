//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status threshold, addresses)
//! - Check tenant records (unique ids, usable URLs)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{ProxyConfig, TenantRecord};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    let workflow = &config.workflow;
    if !workflow.path_prefix.is_empty() && !workflow.path_prefix.starts_with('/') {
        errors.push(ValidationError::new("workflow.path_prefix", "must start with '/'"));
    }
    if workflow.tenant_query_param.trim().is_empty() {
        errors.push(ValidationError::new("workflow.tenant_query_param", "must not be empty"));
    }
    if workflow.deadline_ms == 0 {
        errors.push(ValidationError::new("workflow.deadline_ms", "must be greater than 0"));
    }
    if workflow.invoke_timeout_ms == 0 {
        errors.push(ValidationError::new("workflow.invoke_timeout_ms", "must be greater than 0"));
    }
    if workflow.invoke_timeout_ms > workflow.deadline_ms {
        errors.push(ValidationError::new(
            "workflow.invoke_timeout_ms",
            format!("must not exceed deadline_ms ({})", workflow.deadline_ms),
        ));
    }
    if !(100..=599).contains(&workflow.error_status_threshold) {
        errors.push(ValidationError::new(
            "workflow.error_status_threshold",
            "must be an HTTP status code (100-599)",
        ));
    }

    if config.tenants.file.is_none() && config.tenants.records.is_empty() {
        errors.push(ValidationError::new(
            "tenants",
            "either tenants.file or at least one tenants.records entry is required",
        ));
    }
    errors.extend(validate_records(&config.tenants.records, "tenants.records"));

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::new("admin.api_key", "required when admin is enabled"));
        }
        check_socket_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a set of tenant records (inline or from a tenants file).
pub fn validate_records(records: &[TenantRecord], field: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, record) in records.iter().enumerate() {
        let at = format!("{}[{}]", field, i);
        if record.id.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.id", at), "must not be empty"));
        } else if !seen.insert(record.id.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.id", at),
                format!("duplicate tenant id '{}'", record.id),
            ));
        }

        match Url::parse(&record.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::new(
                format!("{}.url", at),
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(format!("{}.url", at), e.to_string())),
        }

        if record.token.is_empty() {
            errors.push(ValidationError::new(format!("{}.token", at), "must not be empty"));
        }
    }

    errors
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{}' is not a socket address", value)));
    }
}
