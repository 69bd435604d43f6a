//! Tenant configuration lookup.
//!
//! # Data Flow
//! ```text
//! WorkflowExecutor
//!     → CachedConfigStore (optional, bounded TTL)
//!     → MemoryConfigStore | FileConfigStore
//!     → TenantConfig (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Lookups are read-only; stores never mutate per-request state
//! - `NotFound` and `Unavailable` are distinct so the executor can map them
//!   to 400 and 500 respectively
//! - The only shared mutable state is the cache and the swappable record set

pub mod cache;
pub mod file;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::schema::TenantRecord;

pub use cache::{CacheStats, CachedConfigStore};
pub use file::FileConfigStore;
pub use memory::MemoryConfigStore;

/// Outbound endpoint and credential for one tenant.
#[derive(Clone, PartialEq, Eq)]
pub struct TenantConfig {
    pub tenant_id: String,
    pub base_url: String,
    pub auth_token: String,
}

impl TenantConfig {
    pub fn new(
        tenant_id: impl Into<String>,
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            base_url: base_url.into(),
            auth_token: auth_token.into(),
        }
    }
}

// Tokens must never reach the logs.
impl fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfig")
            .field("tenant_id", &self.tenant_id)
            .field("base_url", &self.base_url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl From<&TenantRecord> for TenantConfig {
    fn from(record: &TenantRecord) -> Self {
        Self::new(&record.id, &record.url, &record.token)
    }
}

/// Errors surfaced by a [`ConfigStore`] lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists for the tenant.
    #[error("no configuration found for tenant '{0}'")]
    NotFound(String),

    /// The backing store could not be read.
    #[error("tenant configuration store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value lookup of tenant configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Resolve the configuration for `tenant_id`.
    async fn lookup(&self, tenant_id: &str) -> Result<Arc<TenantConfig>, StoreError>;
}

#[async_trait]
impl<S: ConfigStore + ?Sized> ConfigStore for Arc<S> {
    async fn lookup(&self, tenant_id: &str) -> Result<Arc<TenantConfig>, StoreError> {
        (**self).lookup(tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let config = TenantConfig::new("dev", "https://dev.example.com", "s3cret");
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("dev.example.com"));
        assert!(!rendered.contains("s3cret"));
    }
}
