//! File-backed tenant store.
//!
//! The tenants file is re-read on every lookup; put a
//! [`CachedConfigStore`](crate::store::CachedConfigStore) in front of it to
//! bound the read rate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::loader::check_tenants;
use crate::store::{ConfigStore, StoreError, TenantConfig};

/// Reads tenant records from a TOML file of `[[tenant]]` tables.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn lookup(&self, tenant_id: &str) -> Result<Arc<TenantConfig>, StoreError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tracing::error!(path = ?self.path, error = %e, "Failed to read tenants file");
            StoreError::Unavailable(format!("reading {}: {}", self.path.display(), e))
        })?;

        // An invalid file is unavailable, so cached entries keep being served.
        let records = check_tenants(&content).map_err(|e| {
            tracing::error!(path = ?self.path, error = %e, "Rejected tenants file");
            StoreError::Unavailable(format!("loading {}: {}", self.path.display(), e))
        })?;

        records
            .iter()
            .find(|r| r.id == tenant_id)
            .map(|r| Arc::new(TenantConfig::from(r)))
            .ok_or_else(|| StoreError::NotFound(tenant_id.to_string()))
    }
}
