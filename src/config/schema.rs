//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the tenant proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Workflow pipeline settings (prefix, deadlines, error threshold).
    pub workflow: WorkflowConfig,

    /// Where tenant records come from and how long they are cached.
    pub tenants: TenantsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest inbound request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Settings for each workflow execution.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Fixed prefix inserted between the tenant base URL and the request path.
    pub path_prefix: String,

    /// Query parameter carrying the tenant id.
    pub tenant_query_param: String,

    /// Overall budget for one execution, in milliseconds.
    pub deadline_ms: u64,

    /// Upper bound for the outbound call, in milliseconds.
    pub invoke_timeout_ms: u64,

    /// Lowest upstream status treated as a remote error.
    pub error_status_threshold: u16,

    /// Forward caller headers (minus hop-by-hop headers) to the upstream.
    pub forward_headers: bool,

    /// Log each outbound descriptor at debug level, token redacted.
    pub enable_log: bool,
}

impl WorkflowConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_millis(self.invoke_timeout_ms)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/api/v1".to_string(),
            tenant_query_param: "env".to_string(),
            deadline_ms: 30_000,
            invoke_timeout_ms: 29_000,
            error_status_threshold: 400,
            forward_headers: true,
            enable_log: false,
        }
    }
}

/// Tenant record source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TenantsConfig {
    /// Path to a tenants file of `[[tenant]]` tables. Takes precedence over
    /// inline records.
    pub file: Option<PathBuf>,

    /// Inline tenant records.
    pub records: Vec<TenantRecord>,

    /// Read-through cache TTL in seconds (0 disables the cache).
    pub cache_ttl_secs: u64,

    /// Invalidate the cache when the tenants file changes.
    pub watch: bool,
}

impl TenantsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for TenantsConfig {
    fn default() -> Self {
        Self {
            file: None,
            records: Vec::new(),
            cache_ttl_secs: 60,
            watch: true,
        }
    }
}

/// One tenant's endpoint and credential, as stored.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TenantRecord {
    /// Tenant id (the `env` query parameter value).
    pub id: String,

    /// Upstream base URL.
    pub url: String,

    /// Bearer token sent upstream.
    pub token: String,
}

impl std::fmt::Debug for TenantRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantRecord")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Top-level layout of a tenants file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TenantsFile {
    #[serde(default, rename = "tenant")]
    pub tenants: Vec<TenantRecord>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
