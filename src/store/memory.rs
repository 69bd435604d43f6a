//! In-memory tenant store backed by an atomically swappable map.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::config::schema::TenantRecord;
use crate::store::{ConfigStore, StoreError, TenantConfig};

type Records = HashMap<String, Arc<TenantConfig>>;

/// Tenant records held in memory.
///
/// Readers take a lock-free snapshot; `replace` publishes a whole new record
/// set at once, so a lookup sees either the old or the new set, never a mix.
pub struct MemoryConfigStore {
    records: ArcSwap<Records>,
}

impl MemoryConfigStore {
    pub fn new(configs: impl IntoIterator<Item = TenantConfig>) -> Self {
        Self {
            records: ArcSwap::from_pointee(Self::index(configs)),
        }
    }

    pub fn from_records(records: &[TenantRecord]) -> Self {
        Self::new(records.iter().map(TenantConfig::from))
    }

    /// Atomically replace every record.
    pub fn replace(&self, configs: impl IntoIterator<Item = TenantConfig>) {
        let records = Self::index(configs);
        tracing::info!(tenants = records.len(), "Tenant records replaced");
        self.records.store(Arc::new(records));
    }

    pub fn len(&self) -> usize {
        self.records.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(configs: impl IntoIterator<Item = TenantConfig>) -> Records {
        configs
            .into_iter()
            .map(|c| (c.tenant_id.clone(), Arc::new(c)))
            .collect()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn lookup(&self, tenant_id: &str) -> Result<Arc<TenantConfig>, StoreError> {
        self.records
            .load()
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(tenant_id.to_string()))
    }
}
