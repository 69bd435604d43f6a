//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On tenants file change:
//!     watcher.rs detects change
//!     → loader.rs parses the tenant records
//!     → validation.rs validates them
//!     → tenant cache invalidated
//! ```
//!
//! # Design Decisions
//! - Proxy config is immutable once loaded; only tenant records reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::{
    AdminConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, TenantRecord,
    TenantsConfig, WorkflowConfig,
};
