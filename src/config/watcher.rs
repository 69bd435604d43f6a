//! Tenants file watcher for cache invalidation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_tenants;
use crate::config::schema::TenantRecord;
use crate::config::validation::validate_records;

/// A watcher that monitors the tenants file for changes.
///
/// Every change that parses and validates is forwarded as the new record set.
/// Invalid edits are logged and dropped, so whatever is cached keeps serving.
pub struct TenantsWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<Vec<TenantRecord>>,
}

impl TenantsWatcher {
    /// Create a new TenantsWatcher.
    ///
    /// Returns the watcher and a receiver for validated record sets.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<Vec<TenantRecord>>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned handle must be kept alive for as long as events are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Tenants file change detected");
                        if let Some(records) = reload(&path) {
                            let _ = tx.send(records);
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Tenants watcher started");
        Ok(watcher)
    }
}

fn reload(path: &Path) -> Option<Vec<TenantRecord>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read tenants file. Keeping cached records.");
            return None;
        }
    };
    let records = match parse_tenants(&content) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse tenants file. Keeping cached records.");
            return None;
        }
    };
    let errors = validate_records(&records, "tenant");
    if !errors.is_empty() {
        for err in &errors {
            tracing::error!(error = %err, "Invalid tenant record");
        }
        return None;
    }
    Some(records)
}
