//! Startup orchestration.
//!
//! # Responsibilities
//! - Assemble the tenant store chain from configuration
//! - Initialize subsystems in dependency order (see `main`)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The cache always wraps the backing store; a zero TTL turns it into a
//!   pass-through so the admin surface has one shape to report on

use std::sync::Arc;

use crate::config::TenantsConfig;
use crate::store::{CachedConfigStore, ConfigStore, FileConfigStore, MemoryConfigStore};

/// The read-through cache in front of whichever backing store is configured.
pub type TenantCache = CachedConfigStore<Arc<dyn ConfigStore>>;

/// Build the tenant store chain: file or inline records, behind the cache.
pub fn build_store(config: &TenantsConfig) -> Arc<TenantCache> {
    let backing: Arc<dyn ConfigStore> = match &config.file {
        Some(path) => {
            tracing::info!(path = ?path, "Using file-backed tenant store");
            Arc::new(FileConfigStore::new(path.clone()))
        }
        None => {
            tracing::info!(tenants = config.records.len(), "Using inline tenant records");
            Arc::new(MemoryConfigStore::from_records(&config.records))
        }
    };

    tracing::info!(ttl_secs = config.cache_ttl_secs, "Tenant cache configured");
    Arc::new(CachedConfigStore::new(backing, config.cache_ttl()))
}
