//! Read-through tenant cache with a bounded TTL.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

use crate::observability::metrics;
use crate::store::{ConfigStore, StoreError, TenantConfig};

#[derive(Debug, Clone)]
struct CacheEntry {
    config: Arc<TenantConfig>,
    fetched_at: Instant,
}

/// Snapshot of cache counters for the admin surface.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub stale_served: u64,
}

/// Caches lookups from an inner store for `ttl`.
///
/// Entries are keyed by tenant id only, so one tenant can never be answered
/// with another tenant's record. An expired entry stays readable while it is
/// being refreshed; it is replaced only once the inner store has answered.
pub struct CachedConfigStore<S> {
    inner: S,
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    stale_served: AtomicU64,
}

impl<S: ConfigStore> CachedConfigStore<S> {
    /// A zero `ttl` disables caching; every lookup goes to `inner`.
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale_served: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the cached entry for one tenant.
    pub fn invalidate(&self, tenant_id: &str) -> bool {
        let removed = self.entries.remove(tenant_id).is_some();
        tracing::debug!(tenant_id = %tenant_id, removed, "Tenant cache entry invalidated");
        removed
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        let count = self.entries.len();
        self.entries.clear();
        tracing::info!(entries = count, "Tenant cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
        }
    }

    fn fresh(&self, tenant_id: &str) -> Option<Arc<TenantConfig>> {
        // Clone out of the shard guard immediately; never hold it across an await.
        let entry = self.entries.get(tenant_id)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.config.clone())
        } else {
            None
        }
    }

    fn stale(&self, tenant_id: &str) -> Option<Arc<TenantConfig>> {
        self.entries.get(tenant_id).map(|e| e.config.clone())
    }
}

#[async_trait]
impl<S: ConfigStore> ConfigStore for CachedConfigStore<S> {
    async fn lookup(&self, tenant_id: &str) -> Result<Arc<TenantConfig>, StoreError> {
        if self.ttl.is_zero() {
            return self.inner.lookup(tenant_id).await;
        }

        if let Some(config) = self.fresh(tenant_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_lookup("hit");
            return Ok(config);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup("miss");

        match self.inner.lookup(tenant_id).await {
            Ok(config) => {
                self.entries.insert(
                    tenant_id.to_string(),
                    CacheEntry {
                        config: config.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(config)
            }
            Err(StoreError::NotFound(id)) => {
                self.entries.remove(tenant_id);
                Err(StoreError::NotFound(id))
            }
            Err(StoreError::Unavailable(reason)) => match self.stale(tenant_id) {
                Some(config) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        reason = %reason,
                        "Tenant store unavailable, serving stale entry"
                    );
                    self.stale_served.fetch_add(1, Ordering::Relaxed);
                    metrics::record_cache_lookup("stale");
                    Ok(config)
                }
                None => Err(StoreError::Unavailable(reason)),
            },
        }
    }
}
